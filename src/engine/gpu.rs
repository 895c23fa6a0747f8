//! ### English
//! GL command seam.
//!
//! `GpuApi` covers exactly the GL command stream this renderer issues (shader/program build,
//! texture upload, framebuffer attach/blit, viewport/clear, vertex streams, draw, error polling).
//! The production implementation forwards to gleam; tests use a recording fake.
//!
//! ### 中文
//! GL 命令接缝层。
//!
//! `GpuApi` 只覆盖本渲染器实际发出的 GL 命令流（着色器/program 构建、纹理上传、framebuffer
//! 附件与 blit、viewport/clear、顶点流、绘制、错误轮询）。生产实现转发到 gleam；测试使用记录型 fake。

mod gleam_backend;
mod handles;

#[cfg(test)]
pub(crate) mod fake;

use dpi::PhysicalSize;

pub use gleam_backend::GleamGpu;
pub use handles::{BufferId, FramebufferId, ProgramId, ShaderId, TextureId, VertexArrayId};

use crate::engine::logging::LOG_TAG;

/// ### English
/// `GL_FRAMEBUFFER_COMPLETE`.
///
/// ### 中文
/// `GL_FRAMEBUFFER_COMPLETE`。
pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;

/// ### English
/// Upper bound on `glGetError` drains per check (a lost context may keep reporting).
///
/// ### 中文
/// 单次检查中 `glGetError` 的最大轮询次数（上下文丢失时可能持续报告错误）。
const MAX_ERRORS_PER_CHECK: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// ### English
/// Framebuffer binding point.
///
/// ### 中文
/// Framebuffer 绑定点。
pub enum FramebufferTarget {
    /// ### English
    /// `GL_FRAMEBUFFER` (read + draw).
    ///
    /// ### 中文
    /// `GL_FRAMEBUFFER`（读 + 写）。
    Both,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// ### English
/// Color attachment slot on a framebuffer object.
///
/// ### 中文
/// framebuffer 对象上的颜色附件槽位。
pub enum ColorAttachment {
    Color0,
    Color1,
}

impl ColorAttachment {
    /// ### English
    /// Attachment slot index (`GL_COLOR_ATTACHMENT0 + index`).
    ///
    /// ### 中文
    /// 附件槽位索引（`GL_COLOR_ATTACHMENT0 + index`）。
    pub fn index(self) -> u32 {
        match self {
            ColorAttachment::Color0 => 0,
            ColorAttachment::Color1 => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFilter {
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// ### English
/// Result of `glCheckFramebufferStatus`.
///
/// ### 中文
/// `glCheckFramebufferStatus` 的结果。
pub enum FramebufferStatus {
    Complete,
    /// ### English
    /// Any status other than `GL_FRAMEBUFFER_COMPLETE` (raw enum value kept for diagnostics).
    ///
    /// ### 中文
    /// 除 `GL_FRAMEBUFFER_COMPLETE` 以外的任意状态（保留原始枚举值用于诊断）。
    Incomplete(u32),
}

impl FramebufferStatus {
    /// ### English
    /// Classifies a raw status enum.
    ///
    /// ### 中文
    /// 对原始状态枚举值进行分类。
    pub fn from_raw(raw: u32) -> Self {
        if raw == FRAMEBUFFER_COMPLETE {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::Incomplete(raw)
        }
    }

    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// ### English
/// Blit rectangle in framebuffer pixels (`x0,y0` inclusive, `x1,y1` exclusive).
///
/// ### 中文
/// blit 矩形（framebuffer 像素坐标；`x0,y0` 含，`x1,y1` 不含）。
pub struct BlitRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BlitRect {
    /// ### English
    /// Full rectangle of a surface with the given size, anchored at the origin.
    ///
    /// ### 中文
    /// 以原点为锚点、覆盖给定尺寸的完整矩形。
    pub fn full(size: PhysicalSize<u32>) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: clamp_i32(size.width),
            y1: clamp_i32(size.height),
        }
    }
}

/// ### English
/// Saturating `u32 -> i32` for GL size parameters.
///
/// ### 中文
/// GL 尺寸参数用的饱和 `u32 -> i32` 转换。
#[inline]
pub(crate) fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// ### English
/// The GL command stream used by the renderer.
///
/// All methods take `&self`: the implementation is bound to the thread that has the GL context
/// current, and GL itself is the mutable state. Texture and buffer methods operate on the object
/// currently bound to `GL_TEXTURE_2D` / `GL_ARRAY_BUFFER`, as in GL.
///
/// ### 中文
/// 渲染器使用的 GL 命令流。
///
/// 所有方法都接收 `&self`：实现绑定在 GL 上下文为 current 的线程上，可变状态由 GL 自身持有。
/// 纹理与缓冲区相关方法作用于当前绑定到 `GL_TEXTURE_2D` / `GL_ARRAY_BUFFER` 的对象，与 GL 语义一致。
pub trait GpuApi {
    /// ### English
    /// Shading-language version line prefixed to every shader stage (includes the trailing
    /// newline), e.g. `"#version 310 es\n"`.
    ///
    /// ### 中文
    /// 作为每个着色器阶段前缀的着色语言版本行（包含结尾换行），例如 `"#version 310 es\n"`。
    fn glsl_version_header(&self) -> &str;

    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderId>;
    /// ### English
    /// Sets the shader source from multiple segments (concatenated by the driver).
    ///
    /// ### 中文
    /// 以多个源码片段设置着色器源码（由驱动拼接）。
    fn shader_source(&self, shader: ShaderId, segments: &[&[u8]]);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compiled(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> Option<ProgramId>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn program_linked(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn use_program(&self, program: Option<ProgramId>);
    fn uniform_1i(&self, location: i32, value: i32);
    fn delete_program(&self, program: ProgramId);

    fn create_texture(&self) -> Option<TextureId>;
    fn active_texture_unit(&self, unit: u32);
    fn bind_texture_2d(&self, texture: Option<TextureId>);
    fn set_unpack_alignment(&self, alignment: i32);
    /// ### English
    /// Uploads tightly packed RGB8 pixels to the bound 2D texture (mip level 0).
    ///
    /// ### 中文
    /// 将紧密排列的 RGB8 像素上传到当前绑定的 2D 纹理（mip 0 级）。
    fn tex_image_2d_rgb8(&self, size: PhysicalSize<u32>, pixels: &[u8]);
    fn set_texture_wrap(&self, wrap: TextureWrap);
    fn set_texture_filter(&self, filter: TextureFilter);
    fn delete_texture(&self, texture: TextureId);

    fn create_framebuffer(&self) -> Option<FramebufferId>;
    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: Option<FramebufferId>);
    fn framebuffer_texture_2d(
        &self,
        target: FramebufferTarget,
        attachment: ColorAttachment,
        texture: Option<TextureId>,
    );
    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus;
    fn read_buffer(&self, attachment: ColorAttachment);
    fn draw_buffers(&self, attachments: &[ColorAttachment]);
    /// ### English
    /// Blits the color buffer from the read attachment into the draw attachment(s).
    ///
    /// ### 中文
    /// 将读附件的颜色缓冲 blit 到写附件。
    fn blit_color(&self, src: BlitRect, dst: BlitRect, filter: TextureFilter);
    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    fn create_buffer(&self) -> Option<BufferId>;
    fn bind_array_buffer(&self, buffer: Option<BufferId>);
    /// ### English
    /// Allocates storage for the bound array buffer and fills it with `data`.
    ///
    /// ### 中文
    /// 为当前绑定的 array buffer 分配存储并写入 `data`。
    fn array_buffer_data(&self, data: &[f32]);
    /// ### English
    /// Overwrites the bound array buffer from offset 0 (no reallocation).
    ///
    /// ### 中文
    /// 从偏移 0 覆盖写入当前绑定的 array buffer（不重新分配）。
    fn array_buffer_sub_data(&self, data: &[f32]);
    fn delete_buffer(&self, buffer: BufferId);
    fn create_vertex_array(&self) -> Option<VertexArrayId>;
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    /// ### English
    /// Points attribute `index` at the bound array buffer as tightly packed `f32` tuples.
    ///
    /// ### 中文
    /// 把属性 `index` 指向当前绑定的 array buffer（紧密排列的 `f32` 元组）。
    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32);
    fn enable_vertex_attrib_array(&self, index: u32);

    fn viewport(&self, size: PhysicalSize<u32>);
    fn scissor(&self, size: PhysicalSize<u32>);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_and_depth(&self);
    fn draw_triangles(&self, first: i32, count: i32);

    /// ### English
    /// Pops one error code (`0` means no error).
    ///
    /// ### 中文
    /// 取出一个错误码（`0` 表示无错误）。
    fn get_error(&self) -> u32;
}

/// ### English
/// Drains pending GL errors after `op`, logging each one.
///
/// Purely diagnostic: never changes control flow. Returns the number of errors drained.
///
/// ### 中文
/// 在 `op` 之后取出所有待处理的 GL 错误并逐条记录日志。
///
/// 仅用于诊断，不改变控制流。返回取出的错误数量。
pub fn check_gl_error(gl: &dyn GpuApi, op: &str) -> u32 {
    let mut count = 0;
    while count < MAX_ERRORS_PER_CHECK {
        let error = gl.get_error();
        if error == 0 {
            break;
        }
        log::warn!(target: LOG_TAG, "after {op}() glError (0x{error:x})");
        count += 1;
    }
    count
}
