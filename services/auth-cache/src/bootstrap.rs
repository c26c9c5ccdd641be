//! 组件装配
//!
//! 进程启动时构建一次，显式传给调用方

use std::sync::Arc;

use keel_adapter_redis::{RedisCache, check_connection, create_connection_manager};
use keel_config::{AppConfig, AuthConfig};
use keel_errors::{AppError, AppResult};
use keel_ports::CachePort;
use secrecy::ExposeSecret;
use tracing::info;

use crate::infrastructure::cache::{CacheKeys, LoginThrottle, TokenCache};

/// 认证缓存组件容器
pub struct AuthCache {
    token_cache: Arc<TokenCache>,
    login_throttle: Arc<LoginThrottle>,
}

impl AuthCache {
    /// 基于任意 `CachePort` 构建
    pub fn new(cache: Arc<dyn CachePort>, config: &AuthConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::config(e.to_string()))?;
        let expiry = config
            .token_expiry()
            .map_err(|e| AppError::config(e.to_string()))?;
        let keys = CacheKeys::new(config.namespace.as_str());

        Ok(Self {
            token_cache: Arc::new(TokenCache::new(cache.clone(), keys.clone(), expiry)),
            login_throttle: Arc::new(LoginThrottle::new(
                cache,
                keys,
                config.captcha_after_failures,
            )),
        })
    }

    /// 连接 Redis 并构建
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let mut conn = create_connection_manager(config.redis.url.expose_secret()).await?;
        check_connection(&mut conn).await?;
        info!("Redis connection created");

        Self::new(Arc::new(RedisCache::new(conn)), &config.auth)
    }

    pub fn token_cache(&self) -> Arc<TokenCache> {
        self.token_cache.clone()
    }

    pub fn login_throttle(&self) -> Arc<LoginThrottle> {
        self.login_throttle.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_config::TokenExpiry;
    use std::time::Duration;

    struct NoOpCache;

    #[async_trait::async_trait]
    impl CachePort for NoOpCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> AppResult<()> {
            Ok(())
        }
        async fn replace_keep_ttl(&self, _key: &str, _value: &str) -> AppResult<bool> {
            Ok(false)
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
        async fn delete_if_equals(&self, _key: &str, _expected: &str) -> AppResult<bool> {
            Ok(false)
        }
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(false)
        }
        async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<()> {
            Ok(())
        }
        async fn ttl(&self, _key: &str) -> AppResult<Option<i64>> {
            Ok(None)
        }
        async fn incr_by(&self, _key: &str, delta: i64) -> AppResult<i64> {
            Ok(delta)
        }
        async fn get_int(&self, _key: &str) -> AppResult<Option<i64>> {
            Ok(None)
        }
        async fn hget(&self, _key: &str, _field: &str) -> AppResult<Option<String>> {
            Ok(None)
        }
        async fn hset(&self, _key: &str, _field: &str, _value: &str) -> AppResult<()> {
            Ok(())
        }
        async fn hdel(&self, _key: &str, _field: &str) -> AppResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_new_uses_auth_config() {
        let config = AuthConfig {
            namespace: "dew:auth".to_string(),
            token_expire_seconds: 60,
            captcha_after_failures: 3,
        };
        let auth = AuthCache::new(Arc::new(NoOpCache), &config).unwrap();

        let token_cache = auth.token_cache();
        assert_eq!(token_cache.expiry(), TokenExpiry::After(Duration::from_secs(60)));
        assert_eq!(token_cache.keys().namespace(), "dew:auth");
    }

    #[test]
    fn test_new_rejects_invalid_expiry() {
        let config = AuthConfig {
            token_expire_seconds: 0,
            ..AuthConfig::default()
        };
        let result = AuthCache::new(Arc::new(NoOpCache), &config);
        assert!(matches!(result, Err(AppError::Config(_))));

        let config = AuthConfig {
            token_expire_seconds: i64::MAX,
            ..AuthConfig::default()
        };
        let result = AuthCache::new(Arc::new(NoOpCache), &config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
