//! ### English
//! Strong-typed GL object handles.
//!
//! GL names are plain `u32`s where `0` means "no object". Each resource category gets its own
//! newtype over `NonZeroU32`, so a texture can never be passed where a program is expected and
//! the `0` sentinel is expressed as `None` instead of a live value.
//!
//! ### 中文
//! 强类型的 GL 对象句柄。
//!
//! GL 对象名是普通的 `u32`，其中 `0` 表示“无对象”。每类资源各自使用基于 `NonZeroU32` 的
//! newtype，避免把纹理 ID 误传给需要 program 的位置，`0` 哨兵值统一用 `None` 表达。

use std::fmt;
use std::num::NonZeroU32;

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// ### English
            /// Wraps a raw GL name; returns `None` for the `0` sentinel.
            ///
            /// ### 中文
            /// 包装原始 GL 对象名；`0` 哨兵值返回 `None`。
            #[inline]
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// ### English
            /// Returns the raw GL name.
            ///
            /// ### 中文
            /// 返回原始 GL 对象名。
            #[inline]
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

gl_handle!(
    /// ### English
    /// Shader stage object (vertex or fragment).
    ///
    /// ### 中文
    /// 着色器阶段对象（顶点或片元）。
    ShaderId
);

gl_handle!(
    /// ### English
    /// Linked (or linking) program object.
    ///
    /// ### 中文
    /// 已链接（或正在链接）的 program 对象。
    ProgramId
);

gl_handle!(
    /// ### English
    /// 2D texture object.
    ///
    /// ### 中文
    /// 2D 纹理对象。
    TextureId
);

gl_handle!(
    /// ### English
    /// Framebuffer object.
    ///
    /// ### 中文
    /// Framebuffer 对象。
    FramebufferId
);

gl_handle!(
    /// ### English
    /// Vertex buffer object.
    ///
    /// ### 中文
    /// 顶点缓冲对象。
    BufferId
);

gl_handle!(
    /// ### English
    /// Vertex array object.
    ///
    /// ### 中文
    /// 顶点数组对象。
    VertexArrayId
);
