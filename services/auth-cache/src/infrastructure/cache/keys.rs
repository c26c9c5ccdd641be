//! 缓存键定义

/// 账号 → token 关联
const TOKEN_ID_REL_FLAG: &str = "token:id:rel:";

/// token → 会话信息
const TOKEN_INFO_FLAG: &str = "token:info:";

/// 连续登录错误次数
const LOGIN_ERROR_TIMES_FLAG: &str = "login:error:times:";

/// 登录验证码字符（hash，字段为尝试标识）
const LOGIN_CAPTCHA_TEXT_FLAG: &str = "login:captcha:text";

/// 登录验证码图片（hash，字段为尝试标识）
const LOGIN_CAPTCHA_IMAGE_FLAG: &str = "login:captcha:image";

/// 按命名空间生成缓存键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    namespace: String,
}

impl CacheKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace: String = namespace.into();
        Self {
            namespace: namespace.trim_end_matches(':').to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn token_rel(&self, account_code: &str) -> String {
        format!("{}:{}{}", self.namespace, TOKEN_ID_REL_FLAG, account_code)
    }

    pub fn token_info(&self, token: &str) -> String {
        format!("{}:{}{}", self.namespace, TOKEN_INFO_FLAG, token)
    }

    pub fn login_error_times(&self, attempt_id: &str) -> String {
        format!("{}:{}{}", self.namespace, LOGIN_ERROR_TIMES_FLAG, attempt_id)
    }

    pub fn captcha_text(&self) -> String {
        format!("{}:{}", self.namespace, LOGIN_CAPTCHA_TEXT_FLAG)
    }

    pub fn captcha_image(&self) -> String {
        format!("{}:{}", self.namespace, LOGIN_CAPTCHA_IMAGE_FLAG)
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new("auth")
    }
}
