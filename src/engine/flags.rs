//! ### English
//! Bitflags controlling optional renderer behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask to `checker_blit_create`.
//!
//! ### 中文
//! 控制渲染器可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传给 `checker_blit_create`。

/// ### English
/// Issue the per-frame blit even when the composite framebuffer reports incomplete.
///
/// Without this flag an incomplete framebuffer skips the blit and the base texture keeps its
/// last good content.
///
/// ### 中文
/// 即使合成用 framebuffer 报告不完整，也照常执行每帧 blit。
///
/// 未设置该标志时，framebuffer 不完整会跳过 blit，基础纹理保留上一次的有效内容。
pub const CHECKER_BLIT_FLAG_ATTEMPT_INCOMPLETE_BLIT: u32 = 1 << 0;
