//! Redis Cache 实现

use async_trait::async_trait;
use keel_errors::{AppError, AppResult};
use keel_ports::CachePort;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::time::Duration;

/// Redis Cache
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// 底层连接，用于健康检查
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis get failed: {}", e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => conn
                .set_ex(key, value, duration.as_secs())
                .await
                .map_err(|e| AppError::cache(format!("Redis set failed: {}", e))),
            None => conn
                .set(key, value)
                .await
                .map_err(|e| AppError::cache(format!("Redis set failed: {}", e))),
        }
    }

    async fn replace_keep_ttl(&self, key: &str, value: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();

        // SET XX KEEPTTL：键不存在时返回 nil，不会重建出一个没有 TTL 的键
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::cache(format!("Redis replace failed: {}", e)))?;

        Ok(result.is_some())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis delete failed: {}", e)))
    }

    /// 使用 Lua 脚本原子性地比较并删除
    async fn delete_if_equals(&self, key: &str, expected_value: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();

        let script = Script::new(
            r"
            if redis.call('GET', KEYS[1]) == ARGV[1] then
                return redis.call('DEL', KEYS[1])
            else
                return 0
            end
            ",
        );

        let deleted: i64 = script
            .key(key)
            .arg(expected_value)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::cache(format!("Redis delete_if_equals failed: {}", e)))?;

        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis exists failed: {}", e)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.expire(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| AppError::cache(format!("Redis expire failed: {}", e)))
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis ttl failed: {}", e)))?;

        // -2 表示键不存在，-1 表示没有过期时间
        match ttl {
            -2 | -1 => Ok(None),
            t => Ok(Some(t)),
        }
    }

    async fn incr_by(&self, key: &str, delta: i64) -> AppResult<i64> {
        let mut conn = self.conn.clone();
        conn.incr(key, delta)
            .await
            .map_err(|e| AppError::cache(format!("Redis incr failed: {}", e)))
    }

    async fn get_int(&self, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| AppError::cache(format!("Redis get_int failed: {}", e)))
    }

    async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.hget(key, field)
            .await
            .map_err(|e| AppError::cache(format!("Redis hget failed: {}", e)))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.hset(key, field, value)
            .await
            .map_err(|e| AppError::cache(format!("Redis hset failed: {}", e)))
    }

    async fn hdel(&self, key: &str, field: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.hdel(key, field)
            .await
            .map_err(|e| AppError::cache(format!("Redis hdel failed: {}", e)))
    }
}
