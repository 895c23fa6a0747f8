//! ### English
//! Render context owning every GL object and all per-frame state.
//!
//! The host creates one `RenderContext` per GL context, calls `render_frame` once per frame on
//! the thread where that context is current, and drops it (with the context still current) to
//! release the GL objects.
//!
//! ### 中文
//! 持有全部 GL 对象与所有每帧状态的渲染上下文。
//!
//! 宿主为每个 GL 上下文创建一个 `RenderContext`，在该上下文为 current 的线程上每帧调用一次
//! `render_frame`，并在上下文仍为 current 时 drop 它以释放 GL 对象。

use std::rc::Rc;

use dpi::PhysicalSize;

use crate::engine::config::RendererConfig;
use crate::engine::error::RenderError;
use crate::engine::gpu::{GpuApi, check_gl_error};
use crate::engine::logging::LOG_TAG;

use super::animation::AnimationCycle;
use super::checkerboard::Texture;
use super::compositor::{FrameCompositor, FrameStats, QuadGeometry};
use super::program::ShaderProgram;
use super::render_target::RenderTarget;

pub struct RenderContext {
    gl: Rc<dyn GpuApi>,
    base: Texture,
    target: RenderTarget,
    animation: AnimationCycle,
    compositor: FrameCompositor,
    /// ### English
    /// Guard flag to make GL teardown idempotent.
    ///
    /// ### 中文
    /// 防重入标记：保证 GL 资源销毁幂等。
    destroyed: bool,
}

impl RenderContext {
    /// ### English
    /// Builds the program, the base and animated textures, the render target and the quad.
    ///
    /// A zero surface dimension is clamped to 1. On any failure every object created so far is
    /// deleted and the error is returned; nothing is left for the per-frame path.
    ///
    /// ### 中文
    /// 构建 program、基础纹理与动画纹理、渲染目标以及四边形几何。
    ///
    /// 表面尺寸为 0 的维度会被钳制为 1。任何一步失败时，都会删除已创建的对象并返回错误；
    /// 不会给每帧路径留下半初始化状态。
    pub fn initialize(
        gl: Rc<dyn GpuApi>,
        surface: PhysicalSize<u32>,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let surface = PhysicalSize::new(surface.width.max(1), surface.height.max(1));
        log::info!(
            target: LOG_TAG,
            "setupGraphics({}, {})",
            surface.width,
            surface.height
        );

        let program = match ShaderProgram::build(&*gl) {
            Ok(program) => program,
            Err(err) => {
                log::error!(target: LOG_TAG, "Could not create program.");
                return Err(err);
            }
        };

        gl.viewport(surface);
        check_gl_error(&*gl, "glViewport");

        let (base, target, animation, quad) = match create_resources(&*gl, &config) {
            Ok(resources) => resources,
            Err(err) => {
                program.delete(&*gl);
                return Err(err);
            }
        };

        let compositor = FrameCompositor::new(program, quad, config.background_step, surface);
        log::info!(
            target: LOG_TAG,
            "renderer ready: {} animation frames, {:?} incomplete policy",
            animation.len(),
            config.incomplete_policy
        );

        Ok(Self {
            gl,
            base,
            target,
            animation,
            compositor,
            destroyed: false,
        })
    }

    /// ### English
    /// Renders and composites exactly one frame into the bound default surface.
    ///
    /// ### 中文
    /// 向当前绑定的默认表面渲染并合成恰好一帧。
    pub fn render_frame(&mut self) -> FrameStats {
        self.compositor
            .render_frame(&*self.gl, &mut self.animation, &self.target, &self.base)
    }

    /// ### English
    /// Updates the surface size used to restore viewport and scissor after the off-screen pass.
    ///
    /// ### 中文
    /// 更新离屏 pass 之后恢复 viewport 与 scissor 时使用的表面尺寸。
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));
        if size == self.compositor.viewport() {
            return;
        }
        log::info!(target: LOG_TAG, "resize({}, {})", size.width, size.height);
        self.compositor.set_viewport(size);
    }

    pub fn animation_cursor(&self) -> usize {
        self.animation.cursor()
    }

    #[cfg(test)]
    pub fn background(&self) -> f32 {
        self.compositor.background()
    }

    #[cfg(test)]
    pub fn viewport(&self) -> PhysicalSize<u32> {
        self.compositor.viewport()
    }

    #[cfg(test)]
    pub fn base_texture(&self) -> &Texture {
        &self.base
    }

    /// ### English
    /// Deletes all GL objects owned by this context (idempotent).
    ///
    /// Must run on the thread where the GL context is current.
    ///
    /// ### 中文
    /// 删除该上下文持有的所有 GL 对象（幂等）。
    ///
    /// 必须在 GL 上下文为 current 的线程上执行。
    pub fn destroy_gl_resources(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        let gl = &*self.gl;
        self.compositor.delete(gl);
        self.target.delete(gl);
        self.animation.delete(gl);
        self.base.delete(gl);
        log::info!(target: LOG_TAG, "GL resources released");
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.destroy_gl_resources();
    }
}

fn create_resources(
    gl: &dyn GpuApi,
    config: &RendererConfig,
) -> Result<(Texture, RenderTarget, AnimationCycle, QuadGeometry), RenderError> {
    let base = Texture::checkerboard(gl, config.tile_size, config.base_tile)?;

    let mut animation = match AnimationCycle::generate(gl, config) {
        Ok(animation) => animation,
        Err(err) => {
            base.delete(gl);
            return Err(err);
        }
    };

    let mut target = RenderTarget::new();
    if !target.ensure(gl, &base) {
        let err = target.failure();
        target.delete(gl);
        animation.delete(gl);
        base.delete(gl);
        return Err(err);
    }

    let quad = match QuadGeometry::create(gl) {
        Ok(quad) => quad,
        Err(err) => {
            target.delete(gl);
            animation.delete(gl);
            base.delete(gl);
            return Err(err);
        }
    };

    Ok((base, target, animation, quad))
}
