//! ### English
//! C ABI bindings for the renderer lifecycle (create/render/resize/destroy).
//!
//! ### 中文
//! 渲染器生命周期相关的 C ABI 绑定（create/render/resize/destroy）。

use std::rc::Rc;

use super::{CheckerBlitRenderer, surface_size};
use crate::engine::gpu::GpuApi;
use crate::engine::logging::LOG_TAG;
use crate::engine::{
    GetProcAddress, LoggingConfig, RenderContext, RendererConfig, init_logging, load_gl,
};

#[unsafe(no_mangle)]
/// ### English
/// Creates a renderer on the host's current GL context.
///
/// `get_proc_address` resolves GL entry points by name. `width`/`height` are the default
/// surface size (values below 1 are treated as 1). `flags` is a bitmask of
/// `CHECKER_BLIT_FLAG_*` values.
///
/// Returns NULL when the context cannot be loaded or any GL object fails to build; nothing is
/// left allocated in that case.
///
/// # Safety
/// The GL context must be current on the calling thread, and `get_proc_address` must return
/// entry points of that context.
///
/// ### 中文
/// 在宿主当前的 GL 上下文上创建渲染器。
///
/// `get_proc_address` 按名称解析 GL 入口函数。`width`/`height` 为默认表面尺寸（小于 1 的值按 1
/// 处理）。`flags` 为 `CHECKER_BLIT_FLAG_*` 位掩码。
///
/// 上下文无法加载或任一 GL 对象构建失败时返回 NULL，且不会残留任何已分配资源。
///
/// # Safety
/// GL 上下文必须在调用线程上为 current，且 `get_proc_address` 必须返回该上下文的入口函数。
pub unsafe extern "C" fn checker_blit_create(
    get_proc_address: Option<GetProcAddress>,
    width: i32,
    height: i32,
    flags: u32,
) -> *mut CheckerBlitRenderer {
    init_logging(LoggingConfig::default());

    let Some(get_proc_address) = get_proc_address else {
        log::error!(target: LOG_TAG, "checker_blit_create: get_proc_address is NULL");
        return std::ptr::null_mut();
    };

    let gl: Rc<dyn GpuApi> = match unsafe { load_gl(get_proc_address) } {
        Ok(gl) => Rc::new(gl),
        Err(err) => {
            log::error!(target: LOG_TAG, "{err}");
            return std::ptr::null_mut();
        }
    };

    let config = RendererConfig::from_flags(flags);
    match RenderContext::initialize(gl, surface_size(width, height), config) {
        Ok(context) => Box::into_raw(Box::new(CheckerBlitRenderer { context })),
        Err(err) => {
            log::error!(target: LOG_TAG, "{err}");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Renders one frame into the currently bound default framebuffer.
///
/// ### 中文
/// 向当前绑定的默认 framebuffer 渲染一帧。
pub unsafe extern "C" fn checker_blit_render_frame(renderer: *mut CheckerBlitRenderer) {
    if renderer.is_null() {
        return;
    }
    unsafe { (*renderer).context.render_frame() };
}

#[unsafe(no_mangle)]
/// ### English
/// Updates the surface size restored after the off-screen pass.
///
/// ### 中文
/// 更新离屏 pass 之后恢复的表面尺寸。
pub unsafe extern "C" fn checker_blit_resize(
    renderer: *mut CheckerBlitRenderer,
    width: i32,
    height: i32,
) {
    if renderer.is_null() {
        return;
    }
    unsafe { (*renderer).context.resize(surface_size(width, height)) };
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the index of the animated texture composited by the next frame (0 for NULL).
///
/// ### 中文
/// 返回下一帧将合成的动画纹理索引（NULL 时返回 0）。
pub unsafe extern "C" fn checker_blit_animation_cursor(
    renderer: *const CheckerBlitRenderer,
) -> u32 {
    if renderer.is_null() {
        return 0;
    }
    let cursor = unsafe { (*renderer).context.animation_cursor() };
    u32::try_from(cursor).unwrap_or(u32::MAX)
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a renderer created by `checker_blit_create`, deleting every GL object it owns.
///
/// The GL context must still be current on the calling thread.
///
/// ### 中文
/// 销毁由 `checker_blit_create` 创建的渲染器，并删除其持有的所有 GL 对象。
///
/// 调用线程上的 GL 上下文必须仍为 current。
pub unsafe extern "C" fn checker_blit_destroy(renderer: *mut CheckerBlitRenderer) {
    if renderer.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(renderer));
    }
}
