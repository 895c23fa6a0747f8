//! ### English
//! Per-frame compositor: background pulse, default-surface restore, and the quad draw.
//!
//! ### 中文
//! 每帧合成器：背景渐变、恢复默认表面状态、绘制四边形。

use dpi::PhysicalSize;

use crate::engine::error::RenderError;
use crate::engine::gpu::{
    BufferId, FramebufferTarget, GpuApi, TextureFilter, VertexArrayId, check_gl_error,
};
use crate::engine::logging::LOG_TAG;

use super::animation::{AnimationCycle, Composite};
use super::checkerboard::Texture;
use super::program::{POSITION_ATTRIB, SAMPLER_UNIFORM, ShaderProgram, UV_ATTRIB};
use super::render_target::RenderTarget;

const TRIANGLE_POSITIONS: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];
const TRIANGLE_UVS: [f32; 6] = [0.5, 1.0, 0.0, 0.0, 1.0, 0.0];
const TRIANGLE_VERTICES: i32 = 3;

/// ### English
/// Grey clear value that ramps up by a fixed step per frame and wraps to 0.
///
/// Kept as an integer tick count so the value is `ticks * step` exactly rather than an
/// accumulated float.
///
/// ### 中文
/// 每帧按固定步长递增、超过 1.0 后回绕到 0 的灰度清屏值。
///
/// 以整数 tick 计数保存，使取值恰好为 `ticks * step`，而不是累加的浮点数。
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundPulse {
    step: f32,
    ticks: u32,
    value: f32,
}

impl BackgroundPulse {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            ticks: 0,
            value: 0.0,
        }
    }

    #[cfg(test)]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// ### English
    /// Advances one frame; wraps to 0.0 on the first value that exceeds 1.0.
    ///
    /// ### 中文
    /// 前进一帧；第一次超过 1.0 时回绕为 0.0。
    pub fn advance(&mut self) -> f32 {
        self.ticks = self.ticks.saturating_add(1);
        let value = self.ticks as f32 * self.step;
        if value > 1.0 {
            self.ticks = 0;
            self.value = 0.0;
        } else {
            self.value = value;
        }
        self.value
    }
}

/// ### English
/// Vertex array and the two attribute buffers for the fixed triangle.
///
/// Storage is allocated once; each frame re-streams the static arrays into it.
///
/// ### 中文
/// 固定三角形使用的顶点数组对象与两个属性缓冲区。
///
/// 存储只分配一次；每帧把静态数组重新写入其中。
#[derive(Debug)]
pub struct QuadGeometry {
    vertex_array: VertexArrayId,
    positions: BufferId,
    uvs: BufferId,
}

impl QuadGeometry {
    pub fn create(gl: &dyn GpuApi) -> Result<Self, RenderError> {
        let vertex_array = gl
            .create_vertex_array()
            .ok_or(RenderError::Allocation {
                kind: "vertex array",
            })?;
        let Some(positions) = gl.create_buffer() else {
            gl.delete_vertex_array(vertex_array);
            return Err(RenderError::Allocation { kind: "buffer" });
        };
        let Some(uvs) = gl.create_buffer() else {
            gl.delete_buffer(positions);
            gl.delete_vertex_array(vertex_array);
            return Err(RenderError::Allocation { kind: "buffer" });
        };

        gl.bind_vertex_array(Some(vertex_array));
        for (buffer, data) in [(positions, &TRIANGLE_POSITIONS), (uvs, &TRIANGLE_UVS)] {
            gl.bind_array_buffer(Some(buffer));
            gl.array_buffer_data(data);
        }
        gl.bind_array_buffer(None);
        gl.bind_vertex_array(None);
        check_gl_error(gl, "createQuad");

        Ok(Self {
            vertex_array,
            positions,
            uvs,
        })
    }

    /// ### English
    /// Streams both attribute arrays and enables them; leaves the vertex array bound.
    ///
    /// ### 中文
    /// 写入并启用两个属性数组；调用结束后顶点数组对象保持绑定。
    fn stream(&self, gl: &dyn GpuApi) -> u32 {
        let mut gl_errors = 0;
        gl.bind_vertex_array(Some(self.vertex_array));

        gl.bind_array_buffer(Some(self.positions));
        gl.array_buffer_sub_data(&TRIANGLE_POSITIONS);
        gl.vertex_attrib_pointer_f32(POSITION_ATTRIB, 2);
        gl_errors += check_gl_error(gl, "glVertexAttribPointer");
        gl.enable_vertex_attrib_array(POSITION_ATTRIB);

        gl.bind_array_buffer(Some(self.uvs));
        gl.array_buffer_sub_data(&TRIANGLE_UVS);
        gl.vertex_attrib_pointer_f32(UV_ATTRIB, 2);
        gl_errors += check_gl_error(gl, "glVertexAttribPointer2");
        gl.enable_vertex_attrib_array(UV_ATTRIB);
        gl_errors += check_gl_error(gl, "glEnableVertexAttribArray");

        gl_errors
    }

    pub fn delete(&self, gl: &dyn GpuApi) {
        gl.delete_buffer(self.positions);
        gl.delete_buffer(self.uvs);
        gl.delete_vertex_array(self.vertex_array);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// ### English
/// Summary of one rendered frame.
///
/// ### 中文
/// 单帧渲染结果摘要。
pub struct FrameStats {
    /// ### English
    /// Animation cursor after this frame's advance.
    ///
    /// ### 中文
    /// 本帧前进之后的动画游标。
    pub cursor: usize,
    pub background: f32,
    pub composite: Composite,
    /// ### English
    /// GL errors drained during the frame (diagnostic only).
    ///
    /// ### 中文
    /// 本帧取出的 GL 错误数量（仅用于诊断）。
    pub gl_errors: u32,
}

/// ### English
/// Owns the linked program, the quad geometry, the background pulse and the viewport.
///
/// ### 中文
/// 持有已链接的 program、四边形几何、背景渐变与 viewport。
#[derive(Debug)]
pub struct FrameCompositor {
    program: ShaderProgram,
    quad: QuadGeometry,
    pulse: BackgroundPulse,
    viewport: PhysicalSize<u32>,
}

impl FrameCompositor {
    pub fn new(
        program: ShaderProgram,
        quad: QuadGeometry,
        background_step: f32,
        viewport: PhysicalSize<u32>,
    ) -> Self {
        Self {
            program,
            quad,
            pulse: BackgroundPulse::new(background_step),
            viewport,
        }
    }

    pub fn viewport(&self) -> PhysicalSize<u32> {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: PhysicalSize<u32>) {
        self.viewport = viewport;
    }

    #[cfg(test)]
    pub fn background(&self) -> f32 {
        self.pulse.value()
    }

    /// ### English
    /// Renders one frame into the default framebuffer.
    ///
    /// Order: clear color from the pulse, composite step, rebind the default framebuffer,
    /// viewport + scissor, clear, bind `base` on unit 0, bind program, sampler uniform, stream
    /// vertices, draw. GL errors are polled after each stage and only logged.
    ///
    /// ### 中文
    /// 向默认 framebuffer 渲染一帧。
    ///
    /// 顺序：按渐变值设置清屏色、合成步骤、重新绑定默认 framebuffer、viewport + scissor、清屏、
    /// 在纹理单元 0 绑定 `base`、绑定 program、设置采样器 uniform、写入顶点、绘制。
    /// 每个阶段后轮询 GL 错误，仅记录日志。
    pub fn render_frame(
        &mut self,
        gl: &dyn GpuApi,
        animation: &mut AnimationCycle,
        target: &RenderTarget,
        base: &Texture,
    ) -> FrameStats {
        let background = self.pulse.advance();
        gl.clear_color(background, 0.0, 0.0, 1.0);

        let step = animation.advance_and_composite(gl, target);
        let mut gl_errors = step.gl_errors;
        gl_errors += check_gl_error(gl, "blitTexture");

        gl.bind_framebuffer(FramebufferTarget::Both, None);
        gl.viewport(self.viewport);
        gl.scissor(self.viewport);
        gl_errors += check_gl_error(gl, "glClearColor");

        gl.clear_color_and_depth();
        gl_errors += check_gl_error(gl, "glClear");

        gl.active_texture_unit(0);
        gl.bind_texture_2d(Some(base.id));
        gl_errors += check_gl_error(gl, "glBindTexture");
        gl.set_texture_filter(TextureFilter::Linear);

        gl.use_program(Some(self.program.id()));
        gl_errors += check_gl_error(gl, "glUseProgram");
        gl.uniform_1i(SAMPLER_UNIFORM, 0);
        gl_errors += check_gl_error(gl, "glUniform1i");

        gl_errors += self.quad.stream(gl);
        gl.draw_triangles(0, TRIANGLE_VERTICES);
        gl_errors += check_gl_error(gl, "glDrawArrays");

        if gl_errors > 0 {
            log::debug!(target: LOG_TAG, "frame finished with {gl_errors} GL error(s)");
        }

        FrameStats {
            cursor: animation.cursor(),
            background,
            composite: step.outcome,
            gl_errors,
        }
    }

    pub fn delete(&self, gl: &dyn GpuApi) {
        self.quad.delete(gl);
        self.program.delete(gl);
    }
}
