//! Token 缓存
//!
//! 每个账号同一时间只有一个有效 token。缓存中维护两个相互关联的键：
//! - `<ns>:token:id:rel:<accountCode>` → token
//! - `<ns>:token:info:<token>` → `SessionInfo` JSON
//!
//! 两个键同时创建、同时设置过期时间、同时删除。
//! 存储只保证单键原子性，签发流程（删除旧 token 再写入新 token）由进程内锁串行化；
//! 删除关联时使用比较删除，避免误删并发签发的新 token。

use std::sync::Arc;

use chrono::Utc;
use keel_config::TokenExpiry;
use keel_errors::{AppError, AppResult};
use keel_ports::CachePort;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::keys::CacheKeys;
use crate::domain::{Account, SessionInfo};
use crate::infrastructure::observability::metrics as auth_metrics;

/// 撤销原因（用于日志和指标）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevokeReason {
    /// 调用方主动删除（登出、禁用账号等）
    Removed,
    /// 重新签发时替换旧 token
    Replaced,
}

impl RevokeReason {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::Replaced => "replaced",
        }
    }
}

/// 日志中只输出 token 前缀
fn token_hint(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// Token 缓存
pub struct TokenCache {
    cache: Arc<dyn CachePort>,
    keys: CacheKeys,
    expiry: TokenExpiry,
    // 所有账号的签发共用一把锁
    issue_lock: Mutex<()>,
}

impl TokenCache {
    pub fn new(cache: Arc<dyn CachePort>, keys: CacheKeys, expiry: TokenExpiry) -> Self {
        Self {
            cache,
            keys,
            expiry,
            issue_lock: Mutex::new(()),
        }
    }

    pub fn expiry(&self) -> TokenExpiry {
        self.expiry
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    /// 为账号签发新 token
    ///
    /// 账号已有的 token 会先被删除，持有旧 token 的请求在下一次查询时将变为未认证。
    /// 失败后可以直接重试：中途失败最多留下一份未交给任何调用方的会话信息。
    pub async fn add_token(&self, account: &Account) -> AppResult<SessionInfo> {
        if account.code.trim().is_empty() {
            return Err(AppError::validation("Account code must not be empty"));
        }

        // guard 在所有返回路径（包括 `?`）上释放
        let _guard = self.issue_lock.lock().await;

        self.revoke_by_account_code(&account.code, RevokeReason::Replaced)
            .await?;

        let info = SessionInfo::issue(account, Uuid::new_v4().to_string(), Utc::now());
        let value = info.to_json()?;
        let ttl = self.expiry.as_duration();

        // 先写会话信息再写关联：任何读到新关联的并发调用都能读到对应的会话信息
        self.cache
            .set(&self.keys.token_info(&info.token), &value, ttl)
            .await?;
        self.cache
            .set(&self.keys.token_rel(&info.account_code), &info.token, ttl)
            .await?;

        auth_metrics::record_token_issued();
        info!(
            account_code = %info.account_code,
            token = token_hint(&info.token),
            expiry = ?self.expiry,
            "Token issued"
        );

        Ok(info)
    }

    /// 获取账号当前的 token
    pub async fn get_token(&self, account_code: &str) -> AppResult<Option<String>> {
        self.cache.get(&self.keys.token_rel(account_code)).await
    }

    /// 获取 token 对应的会话信息
    ///
    /// 键不存在或内容无法解析时返回 `None`
    pub async fn get_token_info(&self, token: &str) -> AppResult<Option<SessionInfo>> {
        let Some(raw) = self.cache.get(&self.keys.token_info(token)).await? else {
            return Ok(None);
        };

        match SessionInfo::from_json(&raw) {
            Ok(info) => Ok(Some(info)),
            Err(e) => {
                warn!(
                    token = token_hint(token),
                    error = %e,
                    "Malformed session info, treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// 删除 token，已删除的 token 再次删除不报错
    pub async fn remove_token(&self, token: &str) -> AppResult<()> {
        self.revoke(token, RevokeReason::Removed).await
    }

    /// 删除账号当前的 token
    pub async fn remove_token_by_account_code(&self, account_code: &str) -> AppResult<()> {
        self.revoke_by_account_code(account_code, RevokeReason::Removed)
            .await
    }

    /// 用账号最新数据刷新会话信息
    ///
    /// - 账号未登录：不做任何事，返回 `None`
    /// - 关联存在但会话信息已丢失（过期、被清空）：删除悬挂关联，返回 `None`，
    ///   调用方应要求重新登录
    /// - 否则保留 token、登录时间和剩余 TTL，返回刷新后的会话信息
    pub async fn update_token_info(&self, account: &Account) -> AppResult<Option<SessionInfo>> {
        let Some(token) = self.get_token(&account.code).await? else {
            debug!(account_code = %account.code, "Account not logged in, nothing to update");
            return Ok(None);
        };

        let Some(old) = self.get_token_info(&token).await? else {
            self.clear_stale_association(&account.code, &token).await?;
            return Ok(None);
        };

        let refreshed = old.refreshed(account);
        let written = self
            .cache
            .replace_keep_ttl(&self.keys.token_info(&token), &refreshed.to_json()?)
            .await?;

        if !written {
            // 读取之后会话信息恰好过期或被删除
            self.clear_stale_association(&account.code, &token).await?;
            return Ok(None);
        }

        debug!(
            account_code = %account.code,
            token = token_hint(&token),
            "Session info refreshed"
        );
        Ok(Some(refreshed))
    }

    async fn revoke_by_account_code(
        &self,
        account_code: &str,
        reason: RevokeReason,
    ) -> AppResult<()> {
        let Some(token) = self.get_token(account_code).await? else {
            return Ok(());
        };

        match self.get_token_info(&token).await? {
            Some(info) => self.revoke_session(&token, &info, reason).await,
            // 会话信息已丢失或无法解析，关联不能单独留下
            None => self.clear_stale_association(account_code, &token).await,
        }
    }

    async fn revoke(&self, token: &str, reason: RevokeReason) -> AppResult<()> {
        let Some(info) = self.get_token_info(token).await? else {
            // 同时清掉可能残留的无法解析的会话信息，键不存在时是无操作
            self.cache.delete(&self.keys.token_info(token)).await?;
            debug!(token = token_hint(token), "Token already removed");
            return Ok(());
        };

        self.revoke_session(token, &info, reason).await
    }

    async fn revoke_session(
        &self,
        token: &str,
        info: &SessionInfo,
        reason: RevokeReason,
    ) -> AppResult<()> {
        // 关联可能已指向并发签发的新 token，只删除仍指向本 token 的关联
        self.cache
            .delete_if_equals(&self.keys.token_rel(&info.account_code), token)
            .await?;
        self.cache.delete(&self.keys.token_info(token)).await?;

        auth_metrics::record_token_revoked(reason.as_str());
        info!(
            account_code = %info.account_code,
            token = token_hint(token),
            reason = reason.as_str(),
            "Token revoked"
        );
        Ok(())
    }

    async fn clear_stale_association(&self, account_code: &str, token: &str) -> AppResult<()> {
        let cleared = self
            .cache
            .delete_if_equals(&self.keys.token_rel(account_code), token)
            .await?;
        self.cache.delete(&self.keys.token_info(token)).await?;

        if cleared {
            auth_metrics::record_stale_session_cleared();
            warn!(
                account_code = %account_code,
                token = token_hint(token),
                "Session info missing, removed stale token association; re-login required"
            );
        }
        Ok(())
    }
}
