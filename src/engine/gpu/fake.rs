//! ### English
//! Recording `GpuApi` used by unit tests.
//!
//! Models object lifetimes, shader compile/link, texture storage, framebuffer attachments and
//! completeness, and blits that copy pixels between attachments. No driver is needed.
//!
//! ### 中文
//! 单元测试使用的记录型 `GpuApi`。
//!
//! 模拟对象生命周期、着色器编译/链接、纹理存储、framebuffer 附件与完整性，以及在附件之间
//! 复制像素的 blit。无需驱动。

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use dpi::PhysicalSize;

use super::{
    BlitRect, BufferId, ColorAttachment, FramebufferId, FramebufferStatus, FramebufferTarget,
    GpuApi, ProgramId, ShaderId, ShaderStage, TextureFilter, TextureId, TextureWrap, VertexArrayId,
};

/// ### English
/// `GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT`.
///
/// ### 中文
/// `GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT`。
pub const INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;
/// ### English
/// `GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT`.
///
/// ### 中文
/// `GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT`。
pub const INCOMPLETE_MISSING_ATTACHMENT: u32 = 0x8CD7;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ClearColor([f32; 4]),
    Clear,
    Viewport(PhysicalSize<u32>),
    Scissor(PhysicalSize<u32>),
    BindFramebuffer(FramebufferTarget, Option<FramebufferId>),
    Attach(ColorAttachment, Option<TextureId>),
    ReadBuffer(ColorAttachment),
    DrawBuffers(Vec<ColorAttachment>),
    Blit(BlitRect),
    BindTexture(Option<TextureId>),
    UseProgram(Option<ProgramId>),
    Uniform1i(i32, i32),
    AttribPointer(u32, i32),
    EnableAttrib(u32),
    BufferSubData(Vec<f32>),
    Draw { first: i32, count: i32 },
}

#[derive(Default)]
struct ShaderObject {
    source: Vec<u8>,
    compiled: bool,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<ShaderId>,
    linked: bool,
}

#[derive(Default)]
struct TextureObject {
    size: Option<PhysicalSize<u32>>,
    pixels: Vec<u8>,
    wrap: Option<TextureWrap>,
    filter: Option<TextureFilter>,
}

#[derive(Default)]
struct FramebufferObject {
    attachments: BTreeMap<u32, TextureId>,
    read: Option<ColorAttachment>,
    draw: Vec<ColorAttachment>,
}

#[derive(Default)]
struct State {
    next_name: u32,
    shaders: BTreeMap<ShaderId, ShaderObject>,
    programs: BTreeMap<ProgramId, ProgramObject>,
    textures: BTreeMap<TextureId, TextureObject>,
    framebuffers: BTreeMap<FramebufferId, FramebufferObject>,
    buffers: BTreeMap<BufferId, Vec<f32>>,
    vertex_arrays: BTreeSet<VertexArrayId>,
    bound_framebuffer: Option<FramebufferId>,
    bound_texture: Option<TextureId>,
    bound_buffer: Option<BufferId>,
    framebuffers_created: u32,
    source_segments: Vec<usize>,
    errors: Vec<u32>,
    calls: Vec<Call>,
}

impl State {
    fn next(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

pub struct FakeGpu {
    header: String,
    state: RefCell<State>,
    force_incomplete: Cell<bool>,
    fail_allocations: Cell<bool>,
}

impl FakeGpu {
    pub fn new() -> Self {
        Self {
            header: "#version 310 es\n".to_string(),
            state: RefCell::new(State::default()),
            force_incomplete: Cell::new(false),
            fail_allocations: Cell::new(false),
        }
    }

    pub fn inject_error(&self, code: u32) {
        self.state.borrow_mut().errors.push(code);
    }

    pub fn force_incomplete(&self, incomplete: bool) {
        self.force_incomplete.set(incomplete);
    }

    pub fn fail_allocations(&self, fail: bool) {
        self.fail_allocations.set(fail);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn framebuffers_created(&self) -> u32 {
        self.state.borrow().framebuffers_created
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len() + self.state.borrow().vertex_arrays.len()
    }

    pub fn program_is_linked(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    pub fn texture_pixels(&self, texture: TextureId) -> Vec<u8> {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .map(|t| t.pixels.clone())
            .unwrap_or_default()
    }

    pub fn texture_sampling(
        &self,
        texture: TextureId,
    ) -> (Option<TextureWrap>, Option<TextureFilter>) {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .map(|t| (t.wrap, t.filter))
            .unwrap_or_default()
    }

    /// ### English
    /// Segment count of every `shader_source` call so far.
    ///
    /// ### 中文
    /// 迄今每次 `shader_source` 调用的源码片段数量。
    pub fn shader_segments(&self) -> Vec<usize> {
        self.state.borrow().source_segments.clone()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn allocate(&self) -> Option<u32> {
        if self.fail_allocations.get() {
            return None;
        }
        Some(self.state.borrow_mut().next())
    }

    /// ### English
    /// Compiles when the source carries a version line and a balanced `main` body.
    ///
    /// ### 中文
    /// 源码带有版本行且 `main` 函数体花括号配对时视为编译成功。
    fn compiles(source: &[u8]) -> bool {
        let text = String::from_utf8_lossy(source);
        let opens = text.matches('{').count();
        let closes = text.matches('}').count();
        text.starts_with("#version") && text.contains("void main()") && opens == closes
    }
}

impl GpuApi for FakeGpu {
    fn glsl_version_header(&self) -> &str {
        &self.header
    }

    fn create_shader(&self, _stage: ShaderStage) -> Option<ShaderId> {
        let id = ShaderId::new(self.allocate()?)?;
        self.state
            .borrow_mut()
            .shaders
            .insert(id, ShaderObject::default());
        Some(id)
    }

    fn shader_source(&self, shader: ShaderId, segments: &[&[u8]]) {
        let mut state = self.state.borrow_mut();
        state.source_segments.push(segments.len());
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.source = segments.concat();
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader) {
            object.compiled = Self::compiles(&object.source);
        }
    }

    fn shader_compiled(&self, shader: ShaderId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        if self.shader_compiled(shader) {
            String::new()
        } else {
            "ERROR: 0:1: syntax error".to_string()
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Option<ProgramId> {
        let id = ProgramId::new(self.allocate()?)?;
        self.state
            .borrow_mut()
            .programs
            .insert(id, ProgramObject::default());
        Some(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(object) = self.state.borrow_mut().programs.get_mut(&program) {
            object.attached.push(shader);
        }
    }

    fn link_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        let linked = state.programs.get(&program).is_some_and(|p| {
            p.attached.len() == 2
                && p.attached
                    .iter()
                    .all(|s| state.shaders.get(s).is_some_and(|s| s.compiled))
        });
        if let Some(object) = state.programs.get_mut(&program) {
            object.linked = linked;
        }
    }

    fn program_linked(&self, program: ProgramId) -> bool {
        self.program_is_linked(program)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        if self.program_is_linked(program) {
            String::new()
        } else {
            "error: fragment shader not compiled".to_string()
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_1i(&self, location: i32, value: i32) {
        self.record(Call::Uniform1i(location, value));
    }

    fn delete_program(&self, program: ProgramId) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn create_texture(&self) -> Option<TextureId> {
        let id = TextureId::new(self.allocate()?)?;
        self.state
            .borrow_mut()
            .textures
            .insert(id, TextureObject::default());
        Some(id)
    }

    fn active_texture_unit(&self, _unit: u32) {}

    fn bind_texture_2d(&self, texture: Option<TextureId>) {
        self.state.borrow_mut().bound_texture = texture;
        self.record(Call::BindTexture(texture));
    }

    fn set_unpack_alignment(&self, _alignment: i32) {}

    fn tex_image_2d_rgb8(&self, size: PhysicalSize<u32>, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        let Some(bound) = state.bound_texture else {
            state.errors.push(0x0502);
            return;
        };
        if let Some(object) = state.textures.get_mut(&bound) {
            object.size = Some(size);
            object.pixels = pixels.to_vec();
        }
    }

    fn set_texture_wrap(&self, wrap: TextureWrap) {
        let mut state = self.state.borrow_mut();
        if let Some(bound) = state.bound_texture {
            if let Some(object) = state.textures.get_mut(&bound) {
                object.wrap = Some(wrap);
            }
        }
    }

    fn set_texture_filter(&self, filter: TextureFilter) {
        let mut state = self.state.borrow_mut();
        if let Some(bound) = state.bound_texture {
            if let Some(object) = state.textures.get_mut(&bound) {
                object.filter = Some(filter);
            }
        }
    }

    fn delete_texture(&self, texture: TextureId) {
        self.state.borrow_mut().textures.remove(&texture);
    }

    fn create_framebuffer(&self) -> Option<FramebufferId> {
        let id = FramebufferId::new(self.allocate()?)?;
        let mut state = self.state.borrow_mut();
        state.framebuffers.insert(id, FramebufferObject::default());
        state.framebuffers_created += 1;
        Some(id)
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: Option<FramebufferId>) {
        self.state.borrow_mut().bound_framebuffer = framebuffer;
        self.record(Call::BindFramebuffer(target, framebuffer));
    }

    fn framebuffer_texture_2d(
        &self,
        _target: FramebufferTarget,
        attachment: ColorAttachment,
        texture: Option<TextureId>,
    ) {
        {
            let mut state = self.state.borrow_mut();
            let Some(bound) = state.bound_framebuffer else {
                state.errors.push(0x0502);
                return;
            };
            if let Some(object) = state.framebuffers.get_mut(&bound) {
                match texture {
                    Some(texture) => {
                        object.attachments.insert(attachment.index(), texture);
                    }
                    None => {
                        object.attachments.remove(&attachment.index());
                    }
                }
            }
        }
        self.record(Call::Attach(attachment, texture));
    }

    fn check_framebuffer_status(&self, _target: FramebufferTarget) -> FramebufferStatus {
        if self.force_incomplete.get() {
            return FramebufferStatus::Incomplete(INCOMPLETE_ATTACHMENT);
        }
        let state = self.state.borrow();
        let Some(object) = state
            .bound_framebuffer
            .and_then(|fb| state.framebuffers.get(&fb))
        else {
            return FramebufferStatus::Complete;
        };
        if object.attachments.is_empty() {
            return FramebufferStatus::Incomplete(INCOMPLETE_MISSING_ATTACHMENT);
        }
        let all_have_storage = object
            .attachments
            .values()
            .all(|t| state.textures.get(t).is_some_and(|t| t.size.is_some()));
        if all_have_storage {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::Incomplete(INCOMPLETE_ATTACHMENT)
        }
    }

    fn read_buffer(&self, attachment: ColorAttachment) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(bound) = state.bound_framebuffer {
                if let Some(object) = state.framebuffers.get_mut(&bound) {
                    object.read = Some(attachment);
                }
            }
        }
        self.record(Call::ReadBuffer(attachment));
    }

    fn draw_buffers(&self, attachments: &[ColorAttachment]) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(bound) = state.bound_framebuffer {
                if let Some(object) = state.framebuffers.get_mut(&bound) {
                    object.draw = attachments.to_vec();
                }
            }
        }
        self.record(Call::DrawBuffers(attachments.to_vec()));
    }

    fn blit_color(&self, src: BlitRect, dst: BlitRect, _filter: TextureFilter) {
        self.record(Call::Blit(src));
        if src != dst {
            return;
        }
        let mut state = self.state.borrow_mut();
        let Some(object) = state
            .bound_framebuffer
            .and_then(|fb| state.framebuffers.get(&fb))
        else {
            return;
        };
        let read = object
            .read
            .and_then(|a| object.attachments.get(&a.index()).copied());
        let draws: Vec<TextureId> = object
            .draw
            .iter()
            .filter_map(|a| object.attachments.get(&a.index()).copied())
            .collect();
        let Some(read) = read else {
            return;
        };
        let pixels = state
            .textures
            .get(&read)
            .map(|t| t.pixels.clone())
            .unwrap_or_default();
        for draw in draws {
            if let Some(target) = state.textures.get_mut(&draw) {
                target.pixels = pixels.clone();
            }
        }
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.state.borrow_mut().framebuffers.remove(&framebuffer);
    }

    fn create_buffer(&self) -> Option<BufferId> {
        let id = BufferId::new(self.allocate()?)?;
        self.state.borrow_mut().buffers.insert(id, Vec::new());
        Some(id)
    }

    fn bind_array_buffer(&self, buffer: Option<BufferId>) {
        self.state.borrow_mut().bound_buffer = buffer;
    }

    fn array_buffer_data(&self, data: &[f32]) {
        let mut state = self.state.borrow_mut();
        if let Some(bound) = state.bound_buffer {
            state.buffers.insert(bound, data.to_vec());
        }
    }

    fn array_buffer_sub_data(&self, data: &[f32]) {
        {
            let mut state = self.state.borrow_mut();
            let Some(bound) = state.bound_buffer else {
                state.errors.push(0x0502);
                return;
            };
            let fits = state
                .buffers
                .get(&bound)
                .is_some_and(|b| b.len() >= data.len());
            if !fits {
                state.errors.push(0x0501);
                return;
            }
            if let Some(buffer) = state.buffers.get_mut(&bound) {
                buffer[..data.len()].copy_from_slice(data);
            }
        }
        self.record(Call::BufferSubData(data.to_vec()));
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn create_vertex_array(&self) -> Option<VertexArrayId> {
        let id = VertexArrayId::new(self.allocate()?)?;
        self.state.borrow_mut().vertex_arrays.insert(id);
        Some(id)
    }

    fn bind_vertex_array(&self, _vertex_array: Option<VertexArrayId>) {}

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32) {
        self.record(Call::AttribPointer(index, components));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableAttrib(index));
    }

    fn viewport(&self, size: PhysicalSize<u32>) {
        self.record(Call::Viewport(size));
    }

    fn scissor(&self, size: PhysicalSize<u32>) {
        self.record(Call::Scissor(size));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear_color_and_depth(&self) {
        self.record(Call::Clear);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::Draw { first, count });
    }

    fn get_error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if state.errors.is_empty() {
            0
        } else {
            state.errors.remove(0)
        }
    }
}
