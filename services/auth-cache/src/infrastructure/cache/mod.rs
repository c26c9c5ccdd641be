//! 缓存实现

pub mod keys;
pub mod login_throttle;
pub mod token_cache;

pub use keys::*;
pub use login_throttle::*;
pub use token_cache::*;
