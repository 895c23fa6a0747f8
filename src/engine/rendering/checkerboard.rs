//! ### English
//! Procedural checkerboard textures.
//!
//! ### 中文
//! 程序化生成的棋盘格纹理。

use dpi::PhysicalSize;

use crate::engine::error::RenderError;
use crate::engine::gpu::{GpuApi, TextureFilter, TextureId, TextureWrap, check_gl_error};
use crate::engine::logging::LOG_TAG;

const RGB8_BYTES_PER_PIXEL: usize = 3;

/// ### English
/// Generates tightly packed RGB8 checkerboard pixels, row-major from `y = 0`.
///
/// Pixel `(x, y)` is white (255) when `(x / (3 * tile) + y / tile) % 2 == 1` and black otherwise,
/// so tiles are three times wider than they are tall. A `tile` of 0 is treated as 1.
///
/// ### 中文
/// 生成紧密排列的 RGB8 棋盘格像素（按行优先，从 `y = 0` 开始）。
///
/// 当 `(x / (3 * tile) + y / tile) % 2 == 1` 时像素 `(x, y)` 为白色（255），否则为黑色，
/// 因此格子宽度是高度的三倍。`tile` 为 0 时按 1 处理。
pub fn checkerboard_pixels(size: PhysicalSize<u32>, tile: u32) -> Vec<u8> {
    let tile = tile.max(1);
    let width = size.width as usize;
    let height = size.height as usize;
    let row_len = width * RGB8_BYTES_PER_PIXEL;

    let mut pixels = vec![0u8; row_len * height];
    for (y, row) in pixels.chunks_exact_mut(row_len.max(1)).enumerate() {
        let row_parity = y as u32 / tile;
        for (x, pixel) in row.chunks_exact_mut(RGB8_BYTES_PER_PIXEL).enumerate() {
            let column_parity = x as u32 / (3 * tile);
            let grey = if (column_parity + row_parity) % 2 == 1 {
                255
            } else {
                0
            };
            pixel.fill(grey);
        }
    }
    pixels
}

/// ### English
/// Immutable-content 2D texture owned by the renderer.
///
/// ### 中文
/// 由渲染器持有、内容不再变更的 2D 纹理。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub size: PhysicalSize<u32>,
}

impl Texture {
    /// ### English
    /// Creates a fresh texture holding a checkerboard with the given tile size.
    ///
    /// REPEAT wrap on both axes, LINEAR min/mag filtering. The pixel buffer lives only for the
    /// duration of this call. Leaves `GL_TEXTURE_2D` unbound.
    ///
    /// ### 中文
    /// 创建一张新的棋盘格纹理，格子尺寸为 `tile`。
    ///
    /// 两个方向均为 REPEAT 环绕，min/mag 过滤均为 LINEAR。像素缓冲区只在本次调用期间存在。
    /// 调用结束后 `GL_TEXTURE_2D` 处于未绑定状态。
    pub fn checkerboard(
        gl: &dyn GpuApi,
        size: PhysicalSize<u32>,
        tile: u32,
    ) -> Result<Self, RenderError> {
        let id = gl
            .create_texture()
            .ok_or(RenderError::Allocation { kind: "texture" })?;

        let pixels = checkerboard_pixels(size, tile);
        gl.bind_texture_2d(Some(id));
        gl.set_unpack_alignment(1);
        gl.tex_image_2d_rgb8(size, &pixels);
        gl.set_texture_wrap(TextureWrap::Repeat);
        gl.set_texture_filter(TextureFilter::Linear);
        gl.bind_texture_2d(None);
        check_gl_error(gl, "createTexture");

        log::info!(target: LOG_TAG, "Texture created [{id}] tile {tile}");
        Ok(Self { id, size })
    }

    pub fn delete(&self, gl: &dyn GpuApi) {
        gl.delete_texture(self.id);
    }
}
