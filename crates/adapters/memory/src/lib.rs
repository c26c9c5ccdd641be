//! keel-adapter-memory - 进程内缓存适配器
//!
//! 与 Redis 适配器语义一致的 `CachePort` 实现，用于测试和单节点开发环境

mod cache;

pub use cache::*;
