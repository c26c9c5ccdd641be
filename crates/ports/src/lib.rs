//! ports - 抽象 trait 层
//!
//! 定义认证缓存所依赖的基础设施接口

mod cache;

pub use cache::*;
