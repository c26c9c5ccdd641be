//! auth-cache-check - 启动自检
//!
//! 加载配置、初始化日志、连接 Redis 并输出生效的缓存策略

use anyhow::Context;
use keel_auth_cache::AuthCache;
use keel_config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config_dir = std::env::var("KEEL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = AppConfig::load(&config_dir)
        .with_context(|| format!("Failed to load config from {}", config_dir))?;

    keel_telemetry::init(
        &config.telemetry.log_level,
        config.telemetry.json || config.is_production(),
    )
    .context("Failed to initialize tracing")?;

    let auth = AuthCache::connect(&config)
        .await
        .context("Failed to initialize auth cache")?;
    let token_cache = auth.token_cache();

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        namespace = token_cache.keys().namespace(),
        expiry = ?token_cache.expiry(),
        captcha_after_failures = config.auth.captcha_after_failures,
        "Auth cache ready"
    );

    Ok(())
}
