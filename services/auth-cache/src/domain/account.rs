//! 账号与角色
//!
//! 由外部账号存储提供，这里只消费它们的字段来构建会话快照

use serde::{Deserialize, Serialize};

/// 角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub code: String,
    pub name: String,
    pub tenant_code: String,
}

impl Role {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        tenant_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            tenant_code: tenant_code.into(),
        }
    }
}

/// 账号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// 账号唯一编码
    pub code: String,
    pub login_id: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub name: String,
    pub roles: Vec<Role>,
    /// 调用方自定义的扩展数据
    #[serde(default)]
    pub ext: serde_json::Value,
}

impl Account {
    pub fn new(
        code: impl Into<String>,
        login_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            login_id: login_id.into(),
            mobile: None,
            email: None,
            name: name.into(),
            roles: Vec::new(),
            ext: serde_json::Value::Null,
        }
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_ext(mut self, ext: serde_json::Value) -> Self {
        self.ext = ext;
        self
    }
}
