//! Keel Auth Cache
//!
//! 会话 token 缓存与登录限流：
//! - `domain`: 账号、角色与会话信息
//! - `infrastructure::cache`: `TokenCache`、`LoginThrottle` 及缓存键
//! - `bootstrap`: 组件装配

pub mod bootstrap;
pub mod domain;
pub mod infrastructure;

pub use bootstrap::AuthCache;
pub use domain::{Account, Role, RoleInfo, SessionInfo};
pub use infrastructure::cache::{CacheKeys, LoginThrottle, TokenCache};
