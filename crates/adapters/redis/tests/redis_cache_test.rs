//! Redis CachePort 集成测试
//!
//! 需要可用的 Redis 实例（REDIS_URL，默认 redis://127.0.0.1:6379）：
//! cargo test -p keel-adapter-redis -- --ignored

use keel_adapter_redis::{RedisCache, check_connection, create_connection_manager};
use keel_ports::CachePort;
use std::env;
use std::time::Duration;
use uuid::Uuid;

async fn get_cache() -> RedisCache {
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let conn = create_connection_manager(&redis_url)
        .await
        .expect("Failed to create Redis connection manager");
    RedisCache::new(conn)
}

fn test_key(name: &str) -> String {
    format!("keel:test:{}:{}", name, Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn test_ping() {
    let cache = get_cache().await;
    let mut conn = cache.connection();
    check_connection(&mut conn).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_set_with_ttl_and_clear_ttl() {
    let cache = get_cache().await;
    let key = test_key("ttl");

    cache.set(&key, "v1", Some(Duration::from_secs(60))).await.unwrap();
    let ttl = cache.ttl(&key).await.unwrap().unwrap();
    assert!(ttl > 0 && ttl <= 60);

    // 不带 TTL 的 SET 会清除过期时间
    cache.set(&key, "v2", None).await.unwrap();
    assert_eq!(cache.ttl(&key).await.unwrap(), None);
    assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("v2"));

    cache.delete(&key).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_replace_keep_ttl() {
    let cache = get_cache().await;
    let key = test_key("replace");

    assert!(!cache.replace_keep_ttl(&key, "x").await.unwrap());
    assert!(!cache.exists(&key).await.unwrap());

    cache.set(&key, "old", Some(Duration::from_secs(120))).await.unwrap();
    assert!(cache.replace_keep_ttl(&key, "new").await.unwrap());
    assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("new"));
    assert!(cache.ttl(&key).await.unwrap().is_some());

    cache.delete(&key).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_delete_if_equals() {
    let cache = get_cache().await;
    let key = test_key("cas");

    cache.set(&key, "owner-a", None).await.unwrap();
    assert!(!cache.delete_if_equals(&key, "owner-b").await.unwrap());
    assert!(cache.exists(&key).await.unwrap());
    assert!(cache.delete_if_equals(&key, "owner-a").await.unwrap());
    assert!(!cache.exists(&key).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_counter_and_hash() {
    let cache = get_cache().await;
    let counter = test_key("counter");
    let hash = test_key("hash");

    assert_eq!(cache.get_int(&counter).await.unwrap(), None);
    assert_eq!(cache.incr_by(&counter, 1).await.unwrap(), 1);
    assert_eq!(cache.incr_by(&counter, 1).await.unwrap(), 2);
    assert_eq!(cache.get_int(&counter).await.unwrap(), Some(2));
    cache.delete(&counter).await.unwrap();

    cache.hset(&hash, "a", "1").await.unwrap();
    assert_eq!(cache.hget(&hash, "a").await.unwrap().as_deref(), Some("1"));
    cache.hdel(&hash, "a").await.unwrap();
    assert_eq!(cache.hget(&hash, "a").await.unwrap(), None);
}
