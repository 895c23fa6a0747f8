//! ### English
//! Renderer configuration.
//!
//! ### 中文
//! 渲染器配置。

use dpi::PhysicalSize;

use crate::engine::flags::CHECKER_BLIT_FLAG_ATTEMPT_INCOMPLETE_BLIT;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// ### English
/// What the per-frame composite does when the framebuffer reports incomplete.
///
/// ### 中文
/// 每帧合成时 framebuffer 报告不完整后的处理策略。
pub enum IncompletePolicy {
    /// ### English
    /// Skip the blit; the base texture keeps its last good content.
    ///
    /// ### 中文
    /// 跳过 blit；基础纹理保留上一次的有效内容。
    #[default]
    Skip,
    /// ### English
    /// Log and issue the blit anyway.
    ///
    /// ### 中文
    /// 记录日志后仍然执行 blit。
    Attempt,
}

#[derive(Clone, Debug, PartialEq)]
/// ### English
/// Fixed parameters of the checkerboard animation and the background pulse.
///
/// ### 中文
/// 棋盘格动画与背景渐变的固定参数。
pub struct RendererConfig {
    /// ### English
    /// Size of the base texture and of every animated texture; also the blit rectangle.
    ///
    /// ### 中文
    /// 基础纹理与每张动画纹理的尺寸；同时也是 blit 矩形大小。
    pub tile_size: PhysicalSize<u32>,
    /// ### English
    /// Checker tile size of the static base texture.
    ///
    /// ### 中文
    /// 静态基础纹理的棋盘格尺寸。
    pub base_tile: u32,
    /// ### English
    /// Number of textures in the animated sequence (`N`).
    ///
    /// ### 中文
    /// 动画序列中的纹理数量（`N`）。
    pub animation_frames: usize,
    /// ### English
    /// Checker tile size of animated texture 0; texture `i` uses `first_animated_tile + i`.
    ///
    /// ### 中文
    /// 第 0 张动画纹理的棋盘格尺寸；第 `i` 张使用 `first_animated_tile + i`。
    pub first_animated_tile: u32,
    /// ### English
    /// Per-frame increment of the grey clear value.
    ///
    /// ### 中文
    /// 灰度清屏值每帧的增量。
    pub background_step: f32,
    pub incomplete_policy: IncompletePolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            tile_size: PhysicalSize::new(240, 240),
            base_tile: 6,
            animation_frames: 25,
            first_animated_tile: 3,
            background_step: 0.001,
            incomplete_policy: IncompletePolicy::Skip,
        }
    }
}

impl RendererConfig {
    /// ### English
    /// Default configuration adjusted by the C ABI bitmask (see `engine::flags`).
    ///
    /// ### 中文
    /// 在默认配置的基础上应用 C ABI 位掩码（见 `engine::flags`）。
    pub fn from_flags(flags: u32) -> Self {
        let incomplete_policy = if flags & CHECKER_BLIT_FLAG_ATTEMPT_INCOMPLETE_BLIT != 0 {
            IncompletePolicy::Attempt
        } else {
            IncompletePolicy::Skip
        };
        Self {
            incomplete_policy,
            ..Self::default()
        }
    }

    /// ### English
    /// Checker tile size of animated texture `index`.
    ///
    /// ### 中文
    /// 第 `index` 张动画纹理的棋盘格尺寸。
    pub fn animated_tile(&self, index: usize) -> u32 {
        let offset = u32::try_from(index).unwrap_or(u32::MAX);
        self.first_animated_tile.saturating_add(offset)
    }
}
