//! ### English
//! Animated checkerboard sequence and the per-frame composite blit.
//!
//! Each frame the animated texture under the cursor is attached to color attachment 1 of the
//! render target and blitted over attachment 0 (the base texture).
//!
//! ### 中文
//! 棋盘格动画序列与每帧的合成 blit。
//!
//! 每帧把游标所指的动画纹理挂到渲染目标的颜色附件 1，并 blit 覆盖附件 0（基础纹理）。

use crate::engine::config::{IncompletePolicy, RendererConfig};
use crate::engine::error::RenderError;
use crate::engine::gpu::{
    BlitRect, ColorAttachment, FramebufferStatus, FramebufferTarget, GpuApi, TextureFilter,
    check_gl_error,
};
use crate::engine::logging::LOG_TAG;

use super::checkerboard::Texture;
use super::render_target::RenderTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// ### English
/// Whether a composite step issued the blit.
///
/// ### 中文
/// 一次合成步骤是否执行了 blit。
pub enum Composite {
    Blitted,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeStep {
    pub outcome: Composite,
    /// ### English
    /// GL errors drained while compositing.
    ///
    /// ### 中文
    /// 合成过程中取出的 GL 错误数量。
    pub gl_errors: u32,
}

/// ### English
/// Owns the animated texture sequence and the cursor into it.
///
/// ### 中文
/// 持有动画纹理序列及其游标。
#[derive(Debug)]
pub struct AnimationCycle {
    frames: Vec<Texture>,
    /// ### English
    /// Index of the texture composited by the next step; always `< frames.len()` when non-empty.
    ///
    /// ### 中文
    /// 下一步将合成的纹理索引；序列非空时总是 `< frames.len()`。
    cursor: usize,
    blit_rect: BlitRect,
    policy: IncompletePolicy,
}

impl AnimationCycle {
    /// ### English
    /// Generates `config.animation_frames` checkerboards with tile sizes
    /// `first_animated_tile, first_animated_tile + 1, ...`.
    ///
    /// Textures created before a failure are deleted before the error is returned.
    ///
    /// ### 中文
    /// 生成 `config.animation_frames` 张棋盘格纹理，格子尺寸依次为
    /// `first_animated_tile, first_animated_tile + 1, ...`。
    ///
    /// 若中途失败，会先删除已创建的纹理再返回错误。
    pub fn generate(gl: &dyn GpuApi, config: &RendererConfig) -> Result<Self, RenderError> {
        let mut frames = Vec::with_capacity(config.animation_frames);
        for index in 0..config.animation_frames {
            match Texture::checkerboard(gl, config.tile_size, config.animated_tile(index)) {
                Ok(texture) => frames.push(texture),
                Err(err) => {
                    for texture in &frames {
                        texture.delete(gl);
                    }
                    return Err(err);
                }
            }
        }
        Ok(Self::from_frames(frames, config))
    }

    fn from_frames(frames: Vec<Texture>, config: &RendererConfig) -> Self {
        Self {
            frames,
            cursor: 0,
            blit_rect: BlitRect::full(config.tile_size),
            policy: config.incomplete_policy,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn frames(&self) -> &[Texture] {
        &self.frames
    }

    /// ### English
    /// Blits the current animated texture into the render target's base attachment, then
    /// advances the cursor by one (mod N).
    ///
    /// The cursor advances even when the blit is skipped. Leaves the render target bound.
    ///
    /// ### 中文
    /// 将当前动画纹理 blit 到渲染目标的基础附件，然后游标前进一步（模 N）。
    ///
    /// 即使跳过 blit，游标也会前进。调用结束后渲染目标仍处于绑定状态。
    pub fn advance_and_composite(
        &mut self,
        gl: &dyn GpuApi,
        target: &RenderTarget,
    ) -> CompositeStep {
        let Some(frame) = self.frames.get(self.cursor).copied() else {
            return CompositeStep {
                outcome: Composite::Skipped,
                gl_errors: 0,
            };
        };

        let framebuffer = match target.framebuffer() {
            Some(framebuffer) if target.is_complete() => framebuffer,
            _ => {
                log::trace!(target: LOG_TAG, "render target unavailable; composite skipped");
                self.advance();
                return CompositeStep {
                    outcome: Composite::Skipped,
                    gl_errors: 0,
                };
            }
        };

        let mut gl_errors = 0;
        gl.bind_framebuffer(FramebufferTarget::Both, Some(framebuffer));
        gl_errors += check_gl_error(gl, "blitTexture glBindFramebuffer");

        gl.framebuffer_texture_2d(
            FramebufferTarget::Both,
            ColorAttachment::Color1,
            Some(frame.id),
        );
        gl_errors += check_gl_error(gl, "blitTexture glFramebufferTexture2D");
        gl.read_buffer(ColorAttachment::Color1);
        gl_errors += check_gl_error(gl, "blitTexture glReadBuffer");
        gl.draw_buffers(&[ColorAttachment::Color0]);
        gl_errors += check_gl_error(gl, "blitTexture glDrawBuffers");

        let blit = match gl.check_framebuffer_status(FramebufferTarget::Both) {
            FramebufferStatus::Complete => true,
            FramebufferStatus::Incomplete(raw) => {
                let attempt = self.policy == IncompletePolicy::Attempt;
                log::error!(
                    target: LOG_TAG,
                    "Incomplete frame buffer object! (status 0x{raw:x}, {})",
                    if attempt { "blitting anyway" } else { "keeping last frame" }
                );
                attempt
            }
        };

        let outcome = if blit {
            gl.blit_color(self.blit_rect, self.blit_rect, TextureFilter::Linear);
            gl_errors += check_gl_error(gl, "blitTexture glBlitFramebuffer");
            Composite::Blitted
        } else {
            Composite::Skipped
        };

        log::trace!(
            target: LOG_TAG,
            "composite frame {} ({outcome:?})",
            self.cursor
        );
        self.advance();

        CompositeStep { outcome, gl_errors }
    }

    fn advance(&mut self) {
        if !self.frames.is_empty() {
            self.cursor = (self.cursor + 1) % self.frames.len();
        }
    }

    pub fn delete(&mut self, gl: &dyn GpuApi) {
        for texture in self.frames.drain(..) {
            texture.delete(gl);
        }
        self.cursor = 0;
    }
}
