//! 领域模型

pub mod account;
pub mod session_info;

pub use account::*;
pub use session_info::*;
