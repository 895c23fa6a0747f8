/// ### English
/// `checker_blit` cdylib crate root.
/// Exposes the C ABI via `ffi`; the renderer lives under `engine`.
///
/// ### 中文
/// `checker_blit` 的 cdylib crate 根。
/// 通过 `ffi` 导出 C ABI；渲染器实现位于 `engine` 模块。
mod engine;
mod ffi;
