//! 内存 Cache 实现
//!
//! 过期采用惰性清理：访问某个键时才检查并移除已过期的条目。
//! 时钟使用 `tokio::time::Instant`，测试中可以暂停并推进时间。

use async_trait::async_trait;
use keel_errors::{AppError, AppResult};
use keel_ports::CachePort;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
const NOT_INTEGER: &str = "ERR value is not an integer or out of range";
const INVALID_EXPIRE: &str = "ERR invalid expire time";

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

/// 过期时刻，超出时钟范围时返回错误
fn deadline(ttl: Duration) -> AppResult<Instant> {
    Instant::now()
        .checked_add(ttl)
        .ok_or_else(|| AppError::cache(INVALID_EXPIRE))
}

impl Entry {
    fn string(value: impl Into<String>, ttl: Option<Duration>) -> AppResult<Self> {
        Ok(Self {
            value: Value::Str(value.into()),
            expires_at: ttl.map(deadline).transpose()?,
        })
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 内存缓存
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的键（已排序）
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 未过期的键数量
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 取出未过期的条目，已过期的顺便移除
fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    let now = Instant::now();
    if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

fn parse_int(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>().map_err(|_| AppError::cache(NOT_INTEGER))
}

#[async_trait]
impl CachePort for InMemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            None => Ok(None),
            Some(Entry { value: Value::Str(s), .. }) => Ok(Some(s.clone())),
            Some(_) => Err(AppError::cache(WRONG_TYPE)),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let entry = Entry::string(value, ttl)?;
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn replace_keep_ttl(&self, key: &str, value: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(entry) => {
                entry.value = Value::Str(value.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn delete_if_equals(&self, key: &str, expected_value: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock();
        let matched = match live(&mut entries, key) {
            None => false,
            Some(Entry { value: Value::Str(s), .. }) => s.as_str() == expected_value,
            Some(_) => return Err(AppError::cache(WRONG_TYPE)),
        };
        if matched {
            entries.remove(key);
        }
        Ok(matched)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock();
        Ok(live(&mut entries, key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries.lock();
        if ttl.is_zero() {
            entries.remove(key);
        } else if let Some(entry) = live(&mut entries, key) {
            entry.expires_at = Some(deadline(ttl)?);
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
        let mut entries = self.entries.lock();
        let Some(entry) = live(&mut entries, key) else {
            return Ok(None);
        };
        Ok(entry.expires_at.map(|at| {
            let remaining = at.saturating_duration_since(Instant::now());
            // 与 Redis TTL 一致，按毫秒四舍五入到秒
            ((remaining.as_millis() + 500) / 1000) as i64
        }))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> AppResult<i64> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            None => {
                entries.insert(key.to_string(), Entry::string(delta.to_string(), None)?);
                Ok(delta)
            }
            Some(Entry { value: Value::Str(s), .. }) => {
                let next = parse_int(s)?
                    .checked_add(delta)
                    .ok_or_else(|| AppError::cache("ERR increment or decrement would overflow"))?;
                *s = next.to_string();
                Ok(next)
            }
            Some(_) => Err(AppError::cache(WRONG_TYPE)),
        }
    }

    async fn get_int(&self, key: &str) -> AppResult<Option<i64>> {
        match self.get(key).await? {
            Some(raw) => parse_int(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            None => Ok(None),
            Some(Entry { value: Value::Hash(h), .. }) => Ok(h.get(field).cloned()),
            Some(_) => Err(AppError::cache(WRONG_TYPE)),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            None => {
                let hash = HashMap::from([(field.to_string(), value.to_string())]);
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Hash(hash),
                        expires_at: None,
                    },
                );
                Ok(())
            }
            Some(Entry { value: Value::Hash(h), .. }) => {
                h.insert(field.to_string(), value.to_string());
                Ok(())
            }
            Some(_) => Err(AppError::cache(WRONG_TYPE)),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> AppResult<()> {
        let mut entries = self.entries.lock();
        let now_empty = match live(&mut entries, key) {
            None => return Ok(()),
            Some(Entry { value: Value::Hash(h), .. }) => {
                h.remove(field);
                h.is_empty()
            }
            Some(_) => return Err(AppError::cache(WRONG_TYPE)),
        };
        // Redis 会自动删除空 hash
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }
}
