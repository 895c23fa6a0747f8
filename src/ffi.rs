//! ### English
//! C ABI surface for `checker_blit`.
//!
//! All exported symbols are `extern "C"` functions; the renderer handle is an opaque pointer.
//! Every call must be made on the thread where the host's GL context is current.
//!
//! ### 中文
//! `checker_blit` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；渲染器句柄为不透明指针。
//! 所有调用都必须在宿主 GL 上下文为 current 的线程上进行。
mod abi;
mod renderer;

use dpi::PhysicalSize;

use crate::engine::RenderContext;

/// ### English
/// C ABI version; bumped on any incompatible signature change.
///
/// ### 中文
/// C ABI 版本号；任何不兼容的签名变更都会递增。
pub const CHECKER_BLIT_ABI_VERSION: u32 = 1;

#[repr(C)]
/// ### English
/// Opaque renderer handle owning every GL object created by `checker_blit_create`.
///
/// ### 中文
/// 不透明渲染器句柄，持有 `checker_blit_create` 创建的所有 GL 对象。
pub struct CheckerBlitRenderer {
    context: RenderContext,
}

/// ### English
/// Converts host `i32` dimensions, treating negative or zero values as 1.
///
/// ### 中文
/// 转换宿主传入的 `i32` 尺寸；负数或 0 按 1 处理。
fn surface_size(width: i32, height: i32) -> PhysicalSize<u32> {
    let clamp = |v: i32| u32::try_from(v).unwrap_or(0).max(1);
    PhysicalSize::new(clamp(width), clamp(height))
}
