//! keel-config - 配置加载库

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

/// 表示 Token 永不过期的配置值
pub const NO_EXPIRY: i64 = -1;

/// Token 过期时间上限（秒，约 68 年）
pub const MAX_TOKEN_EXPIRE_SECONDS: i64 = i32::MAX as i64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Token 过期策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenExpiry {
    /// 不设置 TTL，直到显式删除
    Never,
    /// 签发时为 token 相关的两个键设置同样的 TTL
    After(Duration),
}

impl TokenExpiry {
    /// 从秒数解析，`-1` 表示永不过期，其余必须在 `1..=MAX_TOKEN_EXPIRE_SECONDS` 内
    pub fn from_seconds(seconds: i64) -> Result<Self, ConfigError> {
        match seconds {
            NO_EXPIRY => Ok(Self::Never),
            s if (1..=MAX_TOKEN_EXPIRE_SECONDS).contains(&s) => {
                Ok(Self::After(Duration::from_secs(s as u64)))
            }
            s => Err(ConfigError::Invalid(format!(
                "auth.token_expire_seconds must be {} or between 1 and {} seconds, got {}",
                NO_EXPIRY, MAX_TOKEN_EXPIRE_SECONDS, s
            ))),
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::After(d) => Some(*d),
        }
    }
}

/// 认证缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 键命名空间前缀
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_token_expire_seconds")]
    pub token_expire_seconds: i64,
    /// 连续登录失败达到该次数后要求验证码，0 表示不要求
    #[serde(default = "default_captcha_after_failures")]
    pub captcha_after_failures: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            token_expire_seconds: default_token_expire_seconds(),
            captcha_after_failures: default_captcha_after_failures(),
        }
    }
}

fn default_namespace() -> String {
    "auth".to_string()
}

fn default_token_expire_seconds() -> i64 {
    // 7 天
    604800
}

fn default_captcha_after_failures() -> u32 {
    3
}

impl AuthConfig {
    pub fn token_expiry(&self) -> Result<TokenExpiry, ConfigError> {
        TokenExpiry::from_seconds(self.token_expire_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.namespace must not be empty".to_string(),
            ));
        }
        self.token_expiry()?;
        Ok(())
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub redis: RedisConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_app_name() -> String {
    "keel-auth-cache".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 依次合并 `default.toml`、`<APP_ENV>.toml` 和 `KEEL_` 前缀的环境变量，
    /// 环境变量用 `__` 表示层级，例如 `KEEL_AUTH__TOKEN_EXPIRE_SECONDS`
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("KEEL_").split("__"));

        Self::from_figment(figment)
    }

    /// 从任意 figment 提取并校验
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.auth.validate()?;
        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
