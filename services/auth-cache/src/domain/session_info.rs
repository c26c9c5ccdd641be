//! 会话信息
//!
//! 每个已签发 token 对应一份 `SessionInfo`，以 JSON 形式存放在缓存中。
//! 角色列表是签发（或刷新）时的快照，不随账号实时变化。

use chrono::{DateTime, Utc};
use keel_errors::AppResult;
use serde::{Deserialize, Serialize};

use super::account::{Account, Role};

/// 角色快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub code: String,
    pub name: String,
    pub tenant_code: String,
}

impl From<&Role> for RoleInfo {
    fn from(role: &Role) -> Self {
        Self {
            code: role.code.clone(),
            name: role.name.clone(),
            tenant_code: role.tenant_code.clone(),
        }
    }
}

/// 会话信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub token: String,
    pub account_code: String,
    pub login_id: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub name: String,
    pub roles: Vec<RoleInfo>,
    #[serde(default)]
    pub ext: serde_json::Value,
    /// 签发时间，刷新会话数据时保持不变
    pub last_login_time: DateTime<Utc>,
}

impl SessionInfo {
    /// 为新签发的 token 构建会话快照
    pub fn issue(account: &Account, token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            account_code: account.code.clone(),
            login_id: account.login_id.clone(),
            mobile: account.mobile.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            roles: account.roles.iter().map(RoleInfo::from).collect(),
            ext: account.ext.clone(),
            last_login_time: now,
        }
    }

    /// 用账号当前数据重建快照，保留 token 和登录时间
    pub fn refreshed(&self, account: &Account) -> Self {
        Self::issue(account, self.token.clone(), self.last_login_time)
    }

    pub fn has_role(&self, role_code: &str) -> bool {
        self.roles.iter().any(|r| r.code == role_code)
    }

    /// 指定租户下的角色
    pub fn roles_in_tenant<'a>(&'a self, tenant_code: &'a str) -> impl Iterator<Item = &'a RoleInfo> {
        self.roles.iter().filter(move |r| r.tenant_code == tenant_code)
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn account() -> Account {
        Account::new("acc-001", "alice", "Alice")
            .with_mobile("13800000000")
            .with_email("alice@example.com")
            .with_role(Role::new("admin", "Administrator", "t1"))
            .with_role(Role::new("auditor", "Auditor", "t2"))
            .with_ext(json!({ "dept": "ops" }))
    }

    #[test]
    fn test_issue_copies_account_fields() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let info = SessionInfo::issue(&account(), "tok-1", now);

        assert_eq!(info.token, "tok-1");
        assert_eq!(info.account_code, "acc-001");
        assert_eq!(info.login_id, "alice");
        assert_eq!(info.mobile.as_deref(), Some("13800000000"));
        assert_eq!(info.email.as_deref(), Some("alice@example.com"));
        assert_eq!(info.roles.len(), 2);
        assert_eq!(info.roles[0].code, "admin");
        assert_eq!(info.roles[1].tenant_code, "t2");
        assert_eq!(info.ext, json!({ "dept": "ops" }));
        assert_eq!(info.last_login_time, now);
    }

    #[test]
    fn test_refreshed_keeps_token_and_login_time() {
        let then = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let info = SessionInfo::issue(&account(), "tok-1", then);

        let changed = Account::new("acc-001", "alice2", "Alice Liddell")
            .with_role(Role::new("viewer", "Viewer", "t1"));
        let refreshed = info.refreshed(&changed);

        assert_eq!(refreshed.token, "tok-1");
        assert_eq!(refreshed.last_login_time, then);
        assert_eq!(refreshed.login_id, "alice2");
        assert_eq!(refreshed.name, "Alice Liddell");
        assert_eq!(refreshed.mobile, None);
        assert_eq!(refreshed.ext, serde_json::Value::Null);
        assert!(refreshed.has_role("viewer"));
        assert!(!refreshed.has_role("admin"));
    }

    #[test]
    fn test_json_keeps_role_order() {
        let info = SessionInfo::issue(&account(), "tok-1", Utc::now());
        let decoded = SessionInfo::from_json(&info.to_json().unwrap()).unwrap();

        assert_eq!(decoded, info);
        let codes: Vec<&str> = decoded.roles.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["admin", "auditor"]);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(SessionInfo::from_json("not json").is_err());
        assert!(SessionInfo::from_json(r#"{"token":"x"}"#).is_err());
    }

    #[test]
    fn test_roles_in_tenant() {
        let info = SessionInfo::issue(&account(), "tok-1", Utc::now());
        let t1: Vec<&str> = info.roles_in_tenant("t1").map(|r| r.code.as_str()).collect();
        assert_eq!(t1, ["admin"]);
        assert_eq!(info.roles_in_tenant("t3").count(), 0);
    }
}
