use crate::engine::flags;

#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn checker_blit_abi_version() -> u32 {
    super::CHECKER_BLIT_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the flag bit that makes an incomplete composite framebuffer still blit.
///
/// ### 中文
/// 返回“合成 framebuffer 不完整时仍执行 blit”的标志位。
pub extern "C" fn checker_blit_flag_attempt_incomplete_blit() -> u32 {
    flags::CHECKER_BLIT_FLAG_ATTEMPT_INCOMPLETE_BLIT
}
