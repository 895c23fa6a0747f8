//! ### English
//! Rendering module entry point.
//! Splits context loading, the per-resource builders and the render context into submodules.
//!
//! ### 中文
//! 渲染模块入口。
//! 将上下文加载、各类资源构建器与渲染上下文拆分到子模块。

mod animation;
mod checkerboard;
mod compositor;
mod context;
mod program;
mod render_target;
mod shared_context;

pub use context::RenderContext;
pub use shared_context::{GetProcAddress, load_gl};
