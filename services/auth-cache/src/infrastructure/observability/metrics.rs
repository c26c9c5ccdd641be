//! 认证缓存 Metrics
//!
//! 业务指标记录

use metrics::counter;

// ============================================================================
// 会话 Metrics
// ============================================================================

/// 记录 token 签发
pub fn record_token_issued() {
    counter!("auth_tokens_issued_total").increment(1);
}

/// 记录 token 撤销
pub fn record_token_revoked(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!("auth_tokens_revoked_total", &labels).increment(1);
}

/// 记录清理失效关联（token 信息已不存在）
pub fn record_stale_session_cleared() {
    counter!("auth_stale_sessions_cleared_total").increment(1);
}

// ============================================================================
// 登录限流 Metrics
// ============================================================================

/// 记录登录失败
pub fn record_login_failure() {
    counter!("auth_login_failures_total").increment(1);
}

/// 记录验证码下发
pub fn record_captcha_issued() {
    counter!("auth_captchas_issued_total").increment(1);
}
