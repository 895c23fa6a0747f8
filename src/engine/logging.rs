//! ### English
//! Diagnostic sink.
//!
//! Every message goes through the `log` facade with the fixed target [`LOG_TAG`]. The host may
//! install its own `log` backend; otherwise `init_logging` installs `env_logger` once.
//!
//! ### 中文
//! 诊断输出。
//!
//! 所有消息都通过 `log` facade 输出，并使用固定 target [`LOG_TAG`]。宿主可以安装自己的 `log`
//! 后端；否则由 `init_logging` 安装一次 `env_logger`。

use std::sync::Once;

/// ### English
/// Component tag attached to every diagnostic message.
///
/// ### 中文
/// 附加在每条诊断消息上的组件标签。
pub const LOG_TAG: &str = "checker_blit";

/// ### English
/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. `"info"`, `"checker_blit=trace"`).
///
/// ### 中文
/// 日志配置。
///
/// `env_filter` 使用 `env_logger` 的过滤语法（例如 `"info"`、`"checker_blit=trace"`）。
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// ### English
/// Installs the global logger once; later calls are ignored.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info`. If the host already
/// installed a `log` backend, that backend is kept.
///
/// ### 中文
/// 安装一次全局 logger；后续调用会被忽略。
///
/// 过滤规则优先级：`config.env_filter`，其次 `RUST_LOG`，最后 `info`。若宿主已安装 `log`
/// 后端，则保留宿主的后端。
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!(target: LOG_TAG, "logging initialized");
        }
    });
}
