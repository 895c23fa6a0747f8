//! ### English
//! Setup errors reported to the host.
//!
//! Per-frame problems are logged, not returned; only initialization and context loading fail
//! with a `RenderError`.
//!
//! ### 中文
//! 报告给宿主的初始化错误。
//!
//! 每帧的问题只记录日志而不返回；只有初始化与上下文加载会以 `RenderError` 失败。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// ### English
    /// The driver returned the `0` name for a new object.
    ///
    /// ### 中文
    /// 驱动为新对象返回了 `0` 名称。
    #[error("failed to allocate GL {kind} object")]
    Allocation { kind: &'static str },

    #[error("program linking failed: {log}")]
    ProgramLink { log: String },

    #[error("incomplete framebuffer object (status 0x{status:x})")]
    IncompleteFramebuffer { status: u32 },

    #[error("failed to load GL context: {0}")]
    ContextLoad(String),
}
