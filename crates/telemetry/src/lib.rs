//! telemetry - 日志初始化
//!
//! `RUST_LOG` 存在时优先于配置中的日志级别

use tracing_subscriber::{
    EnvFilter, fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 安装全局 tracing subscriber，`json` 为 true 时每条事件输出一行 JSON
///
/// 进程内只能安装一次，重复调用返回错误
pub fn init(log_level: &str, json: bool) -> Result<(), TryInitError> {
    let (text_layer, json_layer) = if json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(text_layer)
        .with(json_layer)
        .try_init()
}
