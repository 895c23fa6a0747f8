//! ### English
//! Lazily created off-screen render target backed by the base texture.
//!
//! ### 中文
//! 延迟创建、以基础纹理为后备存储的离屏渲染目标。

use crate::engine::error::RenderError;
use crate::engine::gpu::{
    ColorAttachment, FramebufferId, FramebufferStatus, FramebufferTarget, GpuApi, TextureId,
};
use crate::engine::logging::LOG_TAG;

use super::checkerboard::Texture;

#[derive(Debug)]
struct TargetState {
    framebuffer: FramebufferId,
    /// ### English
    /// Texture on color attachment 0; fixed once the target exists.
    ///
    /// ### 中文
    /// 颜色附件 0 上的纹理；目标创建后不再改变。
    texture: TextureId,
    /// ### English
    /// Verdict recorded when the target was created.
    ///
    /// ### 中文
    /// 创建目标时记录的完整性结论。
    status: FramebufferStatus,
}

/// ### English
/// Off-screen framebuffer whose sole color attachment (slot 0) is the base texture.
///
/// ### 中文
/// 离屏 framebuffer，唯一的颜色附件（槽位 0）是基础纹理。
#[derive(Debug, Default)]
pub struct RenderTarget {
    state: Option<TargetState>,
}

impl RenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Creates the target on first use and returns whether it is complete.
    ///
    /// The first call creates one framebuffer, attaches `texture` to color attachment 0 at mip
    /// level 0, checks completeness once, and unbinds. Later calls return the recorded verdict
    /// without touching GL; the attachment is never swapped.
    ///
    /// ### 中文
    /// 首次调用时创建目标，并返回其是否完整。
    ///
    /// 首次调用会创建一个 framebuffer，把 `texture` 挂到颜色附件 0（mip 0 级），检查一次完整性
    /// 后解绑。之后的调用直接返回记录的结论，不再访问 GL；附件永远不会被替换。
    pub fn ensure(&mut self, gl: &dyn GpuApi, texture: &Texture) -> bool {
        if let Some(state) = &self.state {
            if state.texture != texture.id {
                log::debug!(
                    target: LOG_TAG,
                    "FBO {} keeps texture {}; ignoring texture {}",
                    state.framebuffer,
                    state.texture,
                    texture.id
                );
            }
            return state.status.is_complete();
        }

        let Some(framebuffer) = gl.create_framebuffer() else {
            log::error!(target: LOG_TAG, "Could not allocate frame buffer object!");
            return false;
        };

        gl.bind_framebuffer(FramebufferTarget::Draw, Some(framebuffer));
        gl.framebuffer_texture_2d(
            FramebufferTarget::Draw,
            ColorAttachment::Color0,
            Some(texture.id),
        );
        let status = gl.check_framebuffer_status(FramebufferTarget::Draw);
        gl.bind_framebuffer(FramebufferTarget::Draw, None);

        self.state = Some(TargetState {
            framebuffer,
            texture: texture.id,
            status,
        });

        match status {
            FramebufferStatus::Complete => {
                log::info!(
                    target: LOG_TAG,
                    "Created FBO {framebuffer} for texture {}.",
                    texture.id
                );
                true
            }
            FramebufferStatus::Incomplete(raw) => {
                log::error!(
                    target: LOG_TAG,
                    "Incomplete frame buffer object! (status 0x{raw:x})"
                );
                false
            }
        }
    }

    /// ### English
    /// Framebuffer object, if it was created (complete or not).
    ///
    /// ### 中文
    /// framebuffer 对象（只要已创建，无论是否完整）。
    pub fn framebuffer(&self) -> Option<FramebufferId> {
        self.state.as_ref().map(|s| s.framebuffer)
    }

    #[cfg(test)]
    pub fn backing_texture(&self) -> Option<TextureId> {
        self.state.as_ref().map(|s| s.texture)
    }

    pub fn is_complete(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.status.is_complete())
    }

    /// ### English
    /// Error describing why `ensure` returned `false`.
    ///
    /// ### 中文
    /// 描述 `ensure` 返回 `false` 原因的错误。
    pub fn failure(&self) -> RenderError {
        match self.state.as_ref().map(|s| s.status) {
            Some(FramebufferStatus::Incomplete(status)) => {
                RenderError::IncompleteFramebuffer { status }
            }
            _ => RenderError::Allocation {
                kind: "framebuffer",
            },
        }
    }

    pub fn delete(&mut self, gl: &dyn GpuApi) {
        if let Some(state) = self.state.take() {
            gl.delete_framebuffer(state.framebuffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use dpi::PhysicalSize;

    use super::*;
    use crate::engine::gpu::fake::{Call, FakeGpu, INCOMPLETE_ATTACHMENT};

    fn texture(gpu: &FakeGpu, tile: u32) -> Texture {
        Texture::checkerboard(gpu, PhysicalSize::new(24, 24), tile).expect("texture")
    }

    #[test]
    fn first_call_creates_and_attaches_to_slot_zero() {
        let gpu = FakeGpu::new();
        let base = texture(&gpu, 6);
        gpu.clear_calls();
        let mut target = RenderTarget::new();

        assert!(target.ensure(&gpu, &base));
        assert_eq!(target.backing_texture(), Some(base.id));
        let calls = gpu.calls();
        let attach = Call::Attach(ColorAttachment::Color0, Some(base.id));
        assert!(calls.contains(&attach));
        assert_eq!(
            calls.last(),
            Some(&Call::BindFramebuffer(FramebufferTarget::Draw, None))
        );
    }

    #[test]
    fn ensure_is_idempotent() {
        let gpu = FakeGpu::new();
        let base = texture(&gpu, 6);
        let other = texture(&gpu, 3);
        let mut target = RenderTarget::new();

        assert!(target.ensure(&gpu, &base));
        let framebuffer = target.framebuffer();
        assert!(target.ensure(&gpu, &base));
        assert!(target.ensure(&gpu, &other));

        assert_eq!(gpu.framebuffers_created(), 1);
        assert_eq!(target.framebuffer(), framebuffer);
        assert_eq!(target.backing_texture(), Some(base.id));
    }

    #[test]
    fn incomplete_verdict_is_sticky() {
        let gpu = FakeGpu::new();
        let base = texture(&gpu, 6);
        let mut target = RenderTarget::new();

        gpu.force_incomplete(true);
        assert!(!target.ensure(&gpu, &base));
        gpu.force_incomplete(false);
        assert!(!target.ensure(&gpu, &base));

        assert_eq!(gpu.framebuffers_created(), 1);
        assert!(matches!(
            target.failure(),
            RenderError::IncompleteFramebuffer {
                status: INCOMPLETE_ATTACHMENT
            }
        ));
    }

    #[test]
    fn texture_without_storage_is_incomplete() {
        let gpu = FakeGpu::new();
        let id = gpu.create_texture().expect("texture name");
        let empty = Texture {
            id,
            size: PhysicalSize::new(24, 24),
        };
        let mut target = RenderTarget::new();

        assert!(!target.ensure(&gpu, &empty));
        assert!(!target.is_complete());
    }

    #[test]
    fn delete_releases_the_framebuffer() {
        let gpu = FakeGpu::new();
        let base = texture(&gpu, 6);
        let mut target = RenderTarget::new();
        target.ensure(&gpu, &base);

        target.delete(&gpu);
        target.delete(&gpu);
        assert_eq!(gpu.live_framebuffers(), 0);
        assert_eq!(target.framebuffer(), None);
    }
}
