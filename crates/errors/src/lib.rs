//! keel-errors - 统一错误处理
//!
//! 缺失的缓存值不是错误，由调用方以 `Option::None` 表达；
//! 这里只承载需要向上传播的失败。

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// 底层 KV 存储不可用或拒绝了操作（网络、超时、WRONGTYPE 等）
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 是否为存储层故障（调用方可自行决定是否重试）
    pub fn is_cache_unavailable(&self) -> bool {
        matches!(self, Self::Cache(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
