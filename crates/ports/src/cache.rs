//! Cache trait 定义

use async_trait::async_trait;
use keel_errors::AppResult;
use std::time::Duration;

/// 缓存 trait
///
/// 只保证单键操作的原子性，不提供跨键事务。
/// 键不存在一律返回 `Ok(None)` 或视为无操作，不返回错误。
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值，`ttl` 为 `None` 时清除原有过期时间
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 仅当键已存在时覆盖，并保留剩余过期时间
    ///
    /// 返回 false 表示键不存在，未写入
    async fn replace_keep_ttl(&self, key: &str, value: &str) -> AppResult<bool>;

    /// 删除缓存
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 值等于 `expected_value` 时才删除，返回是否删除
    async fn delete_if_equals(&self, key: &str, expected_value: &str) -> AppResult<bool>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 设置过期时间
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()>;

    /// 获取 TTL（秒），返回 None 表示键不存在或没有过期时间
    async fn ttl(&self, key: &str) -> AppResult<Option<i64>>;

    /// 原子性递增，键不存在时从 0 开始，返回递增后的值
    async fn incr_by(&self, key: &str, delta: i64) -> AppResult<i64>;

    /// 获取整数值
    async fn get_int(&self, key: &str) -> AppResult<Option<i64>>;

    /// 读取 hash 字段
    async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>>;

    /// 写入 hash 字段
    async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<()>;

    /// 删除 hash 字段
    async fn hdel(&self, key: &str, field: &str) -> AppResult<()>;
}
