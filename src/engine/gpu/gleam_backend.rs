//! ### English
//! `GpuApi` implementation backed by gleam's `Gl` function table.
//!
//! ### 中文
//! 基于 gleam `Gl` 函数表的 `GpuApi` 实现。

use std::rc::Rc;

use dpi::PhysicalSize;
use gleam::gl::{self, Gl};

use super::{
    BlitRect, BufferId, ColorAttachment, FramebufferId, FramebufferStatus, FramebufferTarget,
    GpuApi, ProgramId, ShaderId, ShaderStage, TextureFilter, TextureId, TextureWrap, VertexArrayId,
    clamp_i32,
};

/// ### English
/// gleam-backed GL command stream.
///
/// ### 中文
/// 基于 gleam 的 GL 命令流。
pub struct GleamGpu {
    /// ### English
    /// Loaded GL / GLES function table (current on the rendering thread).
    ///
    /// ### 中文
    /// 已加载的 GL / GLES 函数表（在渲染线程上为 current）。
    gl: Rc<dyn Gl>,
    /// ### English
    /// `#version` line chosen for the loaded context flavor.
    ///
    /// ### 中文
    /// 根据上下文类型选择的 `#version` 行。
    glsl_header: String,
}

impl GleamGpu {
    pub fn new(gl: Rc<dyn Gl>, glsl_header: impl Into<String>) -> Self {
        Self {
            gl,
            glsl_header: glsl_header.into(),
        }
    }
}

fn framebuffer_target(target: FramebufferTarget) -> gl::GLenum {
    match target {
        FramebufferTarget::Both => gl::FRAMEBUFFER,
        FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER,
    }
}

fn color_attachment(attachment: ColorAttachment) -> gl::GLenum {
    gl::COLOR_ATTACHMENT0 + attachment.index()
}

fn filter_enum(filter: TextureFilter) -> gl::GLenum {
    match filter {
        TextureFilter::Linear => gl::LINEAR,
    }
}

impl GpuApi for GleamGpu {
    fn glsl_version_header(&self) -> &str {
        &self.glsl_header
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderId> {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        ShaderId::new(self.gl.create_shader(kind))
    }

    fn shader_source(&self, shader: ShaderId, segments: &[&[u8]]) {
        self.gl.shader_source(shader.get(), segments);
    }

    fn compile_shader(&self, shader: ShaderId) {
        self.gl.compile_shader(shader.get());
    }

    fn shader_compiled(&self, shader: ShaderId) -> bool {
        let mut status = [0];
        unsafe {
            self.gl
                .get_shader_iv(shader.get(), gl::COMPILE_STATUS, &mut status);
        }
        status[0] != 0
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.gl.get_shader_info_log(shader.get())
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.gl.delete_shader(shader.get());
    }

    fn create_program(&self) -> Option<ProgramId> {
        ProgramId::new(self.gl.create_program())
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.gl.attach_shader(program.get(), shader.get());
    }

    fn link_program(&self, program: ProgramId) {
        self.gl.link_program(program.get());
    }

    fn program_linked(&self, program: ProgramId) -> bool {
        let mut status = [0];
        unsafe {
            self.gl
                .get_program_iv(program.get(), gl::LINK_STATUS, &mut status);
        }
        status[0] != 0
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.gl.get_program_info_log(program.get())
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.gl.use_program(program.map_or(0, ProgramId::get));
    }

    fn uniform_1i(&self, location: i32, value: i32) {
        self.gl.uniform_1i(location, value);
    }

    fn delete_program(&self, program: ProgramId) {
        self.gl.delete_program(program.get());
    }

    fn create_texture(&self) -> Option<TextureId> {
        self.gl
            .gen_textures(1)
            .first()
            .copied()
            .and_then(TextureId::new)
    }

    fn active_texture_unit(&self, unit: u32) {
        self.gl.active_texture(gl::TEXTURE0 + unit);
    }

    fn bind_texture_2d(&self, texture: Option<TextureId>) {
        self.gl
            .bind_texture(gl::TEXTURE_2D, texture.map_or(0, TextureId::get));
    }

    fn set_unpack_alignment(&self, alignment: i32) {
        self.gl.pixel_store_i(gl::UNPACK_ALIGNMENT, alignment);
    }

    fn tex_image_2d_rgb8(&self, size: PhysicalSize<u32>, pixels: &[u8]) {
        self.gl.tex_image_2d(
            gl::TEXTURE_2D,
            0,
            gl::RGB8 as gl::GLint,
            clamp_i32(size.width),
            clamp_i32(size.height),
            0,
            gl::RGB,
            gl::UNSIGNED_BYTE,
            Some(pixels),
        );
    }

    fn set_texture_wrap(&self, wrap: TextureWrap) {
        let mode = match wrap {
            TextureWrap::Repeat => gl::REPEAT,
        } as gl::GLint;
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, mode);
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, mode);
    }

    fn set_texture_filter(&self, filter: TextureFilter) {
        let mode = filter_enum(filter) as gl::GLint;
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, mode);
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mode);
    }

    fn delete_texture(&self, texture: TextureId) {
        self.gl.delete_textures(&[texture.get()]);
    }

    fn create_framebuffer(&self) -> Option<FramebufferId> {
        self.gl
            .gen_framebuffers(1)
            .first()
            .copied()
            .and_then(FramebufferId::new)
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: Option<FramebufferId>) {
        self.gl.bind_framebuffer(
            framebuffer_target(target),
            framebuffer.map_or(0, FramebufferId::get),
        );
    }

    fn framebuffer_texture_2d(
        &self,
        target: FramebufferTarget,
        attachment: ColorAttachment,
        texture: Option<TextureId>,
    ) {
        self.gl.framebuffer_texture_2d(
            framebuffer_target(target),
            color_attachment(attachment),
            gl::TEXTURE_2D,
            texture.map_or(0, TextureId::get),
            0,
        );
    }

    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        FramebufferStatus::from_raw(
            self.gl
                .check_frame_buffer_status(framebuffer_target(target)),
        )
    }

    fn read_buffer(&self, attachment: ColorAttachment) {
        self.gl.read_buffer(color_attachment(attachment));
    }

    fn draw_buffers(&self, attachments: &[ColorAttachment]) {
        let buffers: Vec<gl::GLenum> = attachments.iter().copied().map(color_attachment).collect();
        self.gl.draw_buffers(&buffers);
    }

    fn blit_color(&self, src: BlitRect, dst: BlitRect, filter: TextureFilter) {
        self.gl.blit_framebuffer(
            src.x0,
            src.y0,
            src.x1,
            src.y1,
            dst.x0,
            dst.y0,
            dst.x1,
            dst.y1,
            gl::COLOR_BUFFER_BIT,
            filter_enum(filter),
        );
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.gl.delete_framebuffers(&[framebuffer.get()]);
    }

    fn create_buffer(&self) -> Option<BufferId> {
        self.gl
            .gen_buffers(1)
            .first()
            .copied()
            .and_then(BufferId::new)
    }

    fn bind_array_buffer(&self, buffer: Option<BufferId>) {
        self.gl
            .bind_buffer(gl::ARRAY_BUFFER, buffer.map_or(0, BufferId::get));
    }

    fn array_buffer_data(&self, data: &[f32]) {
        gl::buffer_data(&*self.gl, gl::ARRAY_BUFFER, data, gl::STREAM_DRAW);
    }

    fn array_buffer_sub_data(&self, data: &[f32]) {
        gl::buffer_sub_data(&*self.gl, gl::ARRAY_BUFFER, 0, data);
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.gl.delete_buffers(&[buffer.get()]);
    }

    fn create_vertex_array(&self) -> Option<VertexArrayId> {
        self.gl
            .gen_vertex_arrays(1)
            .first()
            .copied()
            .and_then(VertexArrayId::new)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.gl
            .bind_vertex_array(vertex_array.map_or(0, VertexArrayId::get));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.gl.delete_vertex_arrays(&[vertex_array.get()]);
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32) {
        self.gl
            .vertex_attrib_pointer(index, components, gl::FLOAT, false, 0, 0);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.gl.enable_vertex_attrib_array(index);
    }

    fn viewport(&self, size: PhysicalSize<u32>) {
        self.gl
            .viewport(0, 0, clamp_i32(size.width), clamp_i32(size.height));
    }

    fn scissor(&self, size: PhysicalSize<u32>) {
        self.gl
            .scissor(0, 0, clamp_i32(size.width), clamp_i32(size.height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear_color_and_depth(&self) {
        self.gl.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.gl.draw_arrays(gl::TRIANGLES, first, count);
    }

    fn get_error(&self) -> u32 {
        self.gl.get_error()
    }
}
