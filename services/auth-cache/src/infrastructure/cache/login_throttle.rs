//! 登录限流缓存
//!
//! 按尝试标识（如 客户端+账号）记录连续登录失败次数，并保存验证码。
//! 计数器和验证码都不设置过期时间，需要时由调用方清理。

use std::sync::Arc;

use keel_errors::AppResult;
use keel_ports::CachePort;
use tracing::{debug, info};

use super::keys::CacheKeys;
use crate::infrastructure::observability::metrics as auth_metrics;

/// 登录限流
pub struct LoginThrottle {
    cache: Arc<dyn CachePort>,
    keys: CacheKeys,
    captcha_after_failures: u32,
}

impl LoginThrottle {
    pub fn new(cache: Arc<dyn CachePort>, keys: CacheKeys, captcha_after_failures: u32) -> Self {
        Self {
            cache,
            keys,
            captcha_after_failures,
        }
    }

    /// 记录一次登录失败，返回递增后的次数
    pub async fn add_login_error_times(&self, attempt_id: &str) -> AppResult<i64> {
        let times = self
            .cache
            .incr_by(&self.keys.login_error_times(attempt_id), 1)
            .await?;

        auth_metrics::record_login_failure();
        info!(attempt_id = %attempt_id, times, "Login failure recorded");
        Ok(times)
    }

    /// 当前连续失败次数，不存在时为 0
    ///
    /// 纯读取，不会创建或修改计数器
    pub async fn get_login_error_times(&self, attempt_id: &str) -> AppResult<i64> {
        let times = self
            .cache
            .get_int(&self.keys.login_error_times(attempt_id))
            .await?;
        Ok(times.unwrap_or(0))
    }

    /// 清除失败记录（登录成功后）
    pub async fn remove_login_error_times(&self, attempt_id: &str) -> AppResult<()> {
        self.cache
            .delete(&self.keys.login_error_times(attempt_id))
            .await?;
        debug!(attempt_id = %attempt_id, "Login failure counter cleared");
        Ok(())
    }

    /// 失败次数是否已达到要求验证码的阈值
    pub async fn requires_captcha(&self, attempt_id: &str) -> AppResult<bool> {
        if self.captcha_after_failures == 0 {
            return Ok(false);
        }
        let times = self.get_login_error_times(attempt_id).await?;
        Ok(times >= i64::from(self.captcha_after_failures))
    }

    /// 保存验证码的字符和图片
    pub async fn add_captcha(&self, attempt_id: &str, text: &str, image: &str) -> AppResult<()> {
        self.cache
            .hset(&self.keys.captcha_text(), attempt_id, text)
            .await?;
        self.cache
            .hset(&self.keys.captcha_image(), attempt_id, image)
            .await?;

        auth_metrics::record_captcha_issued();
        debug!(attempt_id = %attempt_id, "Captcha stored");
        Ok(())
    }

    pub async fn get_captcha_text(&self, attempt_id: &str) -> AppResult<Option<String>> {
        self.cache.hget(&self.keys.captcha_text(), attempt_id).await
    }

    pub async fn get_captcha_image(&self, attempt_id: &str) -> AppResult<Option<String>> {
        self.cache.hget(&self.keys.captcha_image(), attempt_id).await
    }

    /// 删除验证码的字符和图片
    pub async fn remove_captcha(&self, attempt_id: &str) -> AppResult<()> {
        self.cache
            .hdel(&self.keys.captcha_text(), attempt_id)
            .await?;
        self.cache
            .hdel(&self.keys.captcha_image(), attempt_id)
            .await
    }
}
