/// ### English
/// Renderer internals (GL seam, resource builders, per-frame state, configuration, logging).
///
/// ### 中文
/// 渲染器内部模块（GL 接缝层、资源构建器、每帧状态、配置、日志等）。
pub mod config;
pub mod error;
pub mod flags;
pub mod gpu;
pub mod logging;
pub mod rendering;

pub use config::RendererConfig;
pub use logging::{LoggingConfig, init_logging};
pub use rendering::{GetProcAddress, RenderContext, load_gl};
