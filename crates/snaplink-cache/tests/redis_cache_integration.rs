use std::time::Duration;

use redis::AsyncCommands;
use snaplink_cache::{RedisUrlCache, UrlCache, DEFAULT_CACHE_TTL};
use snaplink_core::ShortCode;
use snaplink_test_infra::redis::RedisServer;

/// Test fixture that keeps the Redis container alive for the test's duration.
struct Fixture {
    redis: RedisServer,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        Self { redis }
    }

    async fn connection(&self) -> redis::aio::MultiplexedConnection {
        self.redis.connection().await.expect("redis connection")
    }
}

#[tokio::test]
async fn get_and_set_round_trip() {
    let fixture = Fixture::start().await;
    let cache = RedisUrlCache::new(fixture.connection().await);
    let code = ShortCode::new("abc123").unwrap();

    assert!(cache.get_url(&code).await.unwrap().is_none());

    cache
        .set_url(&code, "https://example.com", DEFAULT_CACHE_TTL)
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&code).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn value_is_stored_verbatim_with_ttl() {
    let fixture = Fixture::start().await;
    let cache = RedisUrlCache::new(fixture.connection().await);
    let code = ShortCode::new("raw123").unwrap();

    cache
        .set_url(&code, "https://example.com/raw", DEFAULT_CACHE_TTL)
        .await
        .unwrap();

    let mut conn = fixture.connection().await;
    let raw: String = conn.get("snap:url:raw123").await.unwrap();
    assert_eq!(raw, "https://example.com/raw");

    let ttl: i64 = conn.ttl("snap:url:raw123").await.unwrap();
    assert!(ttl > 0 && ttl <= DEFAULT_CACHE_TTL.as_secs() as i64);
}

#[tokio::test]
async fn entries_expire() {
    let fixture = Fixture::start().await;
    let cache = RedisUrlCache::new(fixture.connection().await);
    let code = ShortCode::new("exp123").unwrap();

    cache
        .set_url(&code, "https://example.com", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(cache.get_url(&code).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert!(cache.get_url(&code).await.unwrap().is_none());
}

#[tokio::test]
async fn custom_prefix_isolates_caches() {
    let fixture = Fixture::start().await;
    let cache1 = RedisUrlCache::with_prefix(fixture.connection().await, "prefix1:");
    let cache2 = RedisUrlCache::with_prefix(fixture.connection().await, "prefix2:");
    let code = ShortCode::new("prefix1").unwrap();

    cache1
        .set_url(&code, "https://example.com/prefix", DEFAULT_CACHE_TTL)
        .await
        .unwrap();

    assert!(cache1.get_url(&code).await.unwrap().is_some());
    assert!(
        cache2.get_url(&code).await.unwrap().is_none(),
        "Different prefix should isolate caches"
    );
}
