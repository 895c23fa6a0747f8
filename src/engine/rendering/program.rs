//! ### English
//! Shader program builder for the textured quad.
//!
//! ### 中文
//! 纹理四边形所用的着色器 program 构建器。

use crate::engine::error::RenderError;
use crate::engine::gpu::{GpuApi, ProgramId, ShaderId, ShaderStage};
use crate::engine::logging::LOG_TAG;

/// ### English
/// Attribute location of the 2D clip-space position stream.
///
/// ### 中文
/// 2D 裁剪空间位置流的属性位置。
pub const POSITION_ATTRIB: u32 = 0;

/// ### English
/// Attribute location of the UV stream.
///
/// ### 中文
/// UV 流的属性位置。
pub const UV_ATTRIB: u32 = 1;

/// ### English
/// Uniform location of the `sampler2D` read by the fragment stage.
///
/// ### 中文
/// 片元阶段读取的 `sampler2D` 的 uniform 位置。
pub const SAMPLER_UNIFORM: i32 = 0;

const QUAD_VS: &str = r#"
precision highp float;

layout(location = 0) in vec4 vPosition;
layout(location = 1) in vec2 texCoord;

out vec2 v_texCoord;

void main() {
  gl_Position = vPosition;
  v_texCoord = texCoord;
}
"#;

const QUAD_FS: &str = r#"
precision highp float;

layout(location = 0) uniform sampler2D uTexture0;
in vec2 v_texCoord;
layout(location = 0) out vec4 fsColor;

void main() {
  fsColor = texture(uTexture0, v_texCoord);
}
"#;

/// ### English
/// Linked program that samples one texture onto the quad.
///
/// ### 中文
/// 将一张纹理采样到四边形上的已链接 program。
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
}

impl ShaderProgram {
    /// ### English
    /// Builds the fixed quad program.
    ///
    /// ### 中文
    /// 构建固定的四边形 program。
    pub fn build(gl: &dyn GpuApi) -> Result<Self, RenderError> {
        Self::build_from_sources(gl, QUAD_VS, QUAD_FS)
    }

    /// ### English
    /// Compiles both stage bodies (each prefixed with the context's `#version` line as a
    /// separate source segment) and links them.
    ///
    /// On link failure the program object is deleted and the driver's log is returned in
    /// `RenderError::ProgramLink`. Stage objects are deleted on every path.
    ///
    /// ### 中文
    /// 编译两个阶段的源码主体（每个阶段都以上下文的 `#version` 行作为独立的源码片段前缀）并链接。
    ///
    /// 链接失败时删除 program 对象，并在 `RenderError::ProgramLink` 中返回驱动日志。
    /// 无论成功与否都会删除阶段对象。
    pub fn build_from_sources(
        gl: &dyn GpuApi,
        vertex_body: &str,
        fragment_body: &str,
    ) -> Result<Self, RenderError> {
        let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_body)?;
        let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment_body) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };
        log::info!(target: LOG_TAG, "Compiled shaders");

        let Some(program) = gl.create_program() else {
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
            return Err(RenderError::Allocation { kind: "program" });
        };

        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);

        let result = if gl.program_linked(program) {
            log::info!(target: LOG_TAG, "Compiled program {program}");
            Ok(Self { id: program })
        } else {
            let log = gl.program_info_log(program);
            log::error!(target: LOG_TAG, "Program linking failed:\n{log}");
            gl.delete_program(program);
            Err(RenderError::ProgramLink { log })
        };

        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        result
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn delete(&self, gl: &dyn GpuApi) {
        gl.delete_program(self.id);
    }
}

fn compile_stage(gl: &dyn GpuApi, stage: ShaderStage, body: &str) -> Result<ShaderId, RenderError> {
    let kind = match stage {
        ShaderStage::Vertex => "vertex shader",
        ShaderStage::Fragment => "fragment shader",
    };
    let shader = gl
        .create_shader(stage)
        .ok_or(RenderError::Allocation { kind })?;

    let header = gl.glsl_version_header();
    gl.shader_source(shader, &[header.as_bytes(), body.as_bytes()]);
    gl.compile_shader(shader);

    // A failed compile is logged here and surfaces as a link error.
    if !gl.shader_compiled(shader) {
        let log = gl.shader_info_log(shader);
        log::error!(target: LOG_TAG, "Compiling {kind} failed:\n{log}");
    }

    Ok(shader)
}
