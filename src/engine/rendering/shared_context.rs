//! ### English
//! Loads the host's current GL context.
//!
//! The host owns context creation and `makeCurrent`; this module only resolves function pointers
//! through the host's `get_proc_address`, logs what the driver reports, and picks the GLSL
//! version line for the loaded flavor (GLES or desktop GL).
//!
//! ### 中文
//! 加载宿主当前的 GL 上下文。
//!
//! 上下文的创建与 `makeCurrent` 由宿主负责；本模块只通过宿主提供的 `get_proc_address` 解析
//! 函数指针、记录驱动报告的信息，并为加载到的上下文类型（GLES 或桌面 GL）选择 GLSL 版本行。

use std::ffi::{CStr, CString, c_char, c_void};
use std::rc::Rc;

use gleam::gl::{self, Gl};
use glow::HasContext as _;

use crate::engine::error::RenderError;
use crate::engine::gpu::GleamGpu;
use crate::engine::logging::LOG_TAG;

/// ### English
/// Host callback resolving a GL entry point by NUL-terminated name (e.g. `eglGetProcAddress`).
///
/// ### 中文
/// 宿主回调：按 NUL 结尾的名称解析 GL 入口函数（例如 `eglGetProcAddress`）。
pub type GetProcAddress = unsafe extern "C" fn(name: *const c_char) -> *const c_void;

const GLES_GLSL_HEADER: &str = "#version 310 es\n";
const DESKTOP_GLSL_HEADER: &str = "#version 430 core\n";

type GetStringFn = unsafe extern "system" fn(name: u32) -> *const u8;

/// ### English
/// Entry points glow calls while building its context.
///
/// ### 中文
/// glow 构建上下文时会调用的入口函数。
const QUERY_ENTRY_POINTS: [&str; 3] = ["glGetString", "glGetIntegerv", "glGetStringi"];

/// ### English
/// Expected forms: `"4.6.0 ..."` or `"OpenGL ES 3.2 ..."`.
///
/// ### 中文
/// 期望的版本字符串形式：`"4.6.0 ..."` 或 `"OpenGL ES 3.2 ..."`。
fn parse_gl_version(version: &str) -> (u32, u32) {
    let Some(token) = version
        .split_whitespace()
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
    else {
        return (0, 0);
    };

    let mut parts = token.split('.');
    let major = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let minor = parts
        .next()
        .map(|s| s.trim_end_matches(|c: char| !c.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    (major, minor)
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// ### English
/// Strings and version reported by the loaded context.
///
/// ### 中文
/// 已加载上下文报告的字符串与版本信息。
pub struct ContextInfo {
    pub version: String,
    pub vendor: String,
    pub renderer: String,
    pub extension_count: usize,
    pub is_gles: bool,
    pub major: u32,
    pub minor: u32,
}

impl ContextInfo {
    fn from_version(version: String) -> Self {
        let is_gles = version.starts_with("OpenGL ES");
        let (major, minor) = parse_gl_version(&version);
        Self {
            version,
            vendor: String::new(),
            renderer: String::new(),
            extension_count: 0,
            is_gles,
            major,
            minor,
        }
    }

    /// ### English
    /// `#version` line prefixed to every shader stage.
    ///
    /// ### 中文
    /// 作为每个着色器阶段前缀的 `#version` 行。
    pub fn glsl_version_header(&self) -> &'static str {
        if self.is_gles {
            GLES_GLSL_HEADER
        } else {
            DESKTOP_GLSL_HEADER
        }
    }

    /// ### English
    /// GLES 3.1 or desktop GL 4.3: the first versions with `#version 310 es` / `430 core`,
    /// multiple draw buffers and framebuffer blits.
    ///
    /// ### 中文
    /// GLES 3.1 或桌面 GL 4.3：首个支持 `#version 310 es` / `430 core`、多 draw buffer 与
    /// framebuffer blit 的版本。
    pub fn meets_minimum(&self) -> bool {
        let required = if self.is_gles { (3, 1) } else { (4, 3) };
        (self.major, self.minor) >= required
    }
}

/// ### English
/// Reads `GL_VERSION` through a `glGetString` resolved by hand.
///
/// A missing query entry point or a null `GL_VERSION` (no current context) yields
/// `ContextLoad`; the glow context is only built after both checks pass.
///
/// ### 中文
/// 通过手动解析的 `glGetString` 读取 `GL_VERSION`。
///
/// 缺少查询入口或 `GL_VERSION` 为 null（没有 current 上下文）时返回 `ContextLoad`；
/// 两项检查都通过后才会构建 glow 上下文。
unsafe fn read_gl_version(lookup: impl Fn(&str) -> *const c_void) -> Result<String, RenderError> {
    if let Some(missing) = QUERY_ENTRY_POINTS
        .iter()
        .find(|&&name| lookup(name).is_null())
    {
        return Err(RenderError::ContextLoad(format!(
            "{missing} is not available; is a context current?"
        )));
    }

    let get_string = unsafe {
        std::mem::transmute::<*const c_void, GetStringFn>(lookup("glGetString"))
    };
    let raw = unsafe { get_string(glow::VERSION) };
    if raw.is_null() {
        return Err(RenderError::ContextLoad(
            "GL_VERSION is null; is a context current?".to_string(),
        ));
    }

    unsafe { CStr::from_ptr(raw.cast::<c_char>()) }
        .to_str()
        .map(str::to_owned)
        .map_err(|_| RenderError::ContextLoad("GL_VERSION is not UTF-8".to_string()))
}

/// ### English
/// Resolves the GL function tables through `get_proc_address`.
///
/// Must be called on the thread where the host's GL context is current.
///
/// # Safety
/// `get_proc_address` must be safe to call with any NUL-terminated name and must return either
/// null or a pointer to the matching entry point of the current context.
///
/// ### 中文
/// 通过 `get_proc_address` 解析 GL 函数表。
///
/// 必须在宿主 GL 上下文为 current 的线程上调用。
///
/// # Safety
/// `get_proc_address` 必须能以任意 NUL 结尾的名称安全调用，并返回 null 或当前上下文对应入口的指针。
pub unsafe fn load_gl(get_proc_address: GetProcAddress) -> Result<GleamGpu, RenderError> {
    let lookup = move |name: &str| -> *const c_void {
        match CString::new(name) {
            Ok(name) => unsafe { get_proc_address(name.as_ptr()) },
            Err(_) => std::ptr::null(),
        }
    };

    let mut info = ContextInfo::from_version(unsafe { read_gl_version(lookup)? });
    log::info!(target: LOG_TAG, "GL Version = {}", info.version);

    if !info.meets_minimum() {
        return Err(RenderError::ContextLoad(format!(
            "unsupported context {}.{} ({})",
            info.major,
            info.minor,
            if info.is_gles { "GLES" } else { "GL" }
        )));
    }

    {
        let glow = unsafe { glow::Context::from_loader_function(lookup) };
        info.vendor = unsafe { glow.get_parameter_string(glow::VENDOR) };
        info.renderer = unsafe { glow.get_parameter_string(glow::RENDERER) };
        info.extension_count = glow.supported_extensions().len();
    }
    log::info!(target: LOG_TAG, "GL Vendor = {}", info.vendor);
    log::info!(target: LOG_TAG, "GL Renderer = {}", info.renderer);
    log::info!(target: LOG_TAG, "GL Extensions = {}", info.extension_count);

    let gl: Rc<dyn Gl> = unsafe {
        if info.is_gles {
            gl::GlesFns::load_with(lookup)
        } else {
            gl::GlFns::load_with(lookup)
        }
    };

    Ok(GleamGpu::new(gl, info.glsl_version_header()))
}
