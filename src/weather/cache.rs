use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache read failed: {0}")]
    Read(String),
    #[error("cache write failed: {0}")]
    Write(String),
}

/// Key-value store with per-key expiration.
///
/// Values are opaque serialized bytes; keys are city names exactly as the
/// caller supplied them (case-sensitive, so "Paris" and "paris" are distinct
/// entries). Implementations must tolerate concurrent get/set on the same
/// key; last writer wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct CachedValue {
    bytes: Arc<Vec<u8>>,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // Overwriting a live key must restart expiry from the new value's TTL,
    // not keep the previous writer's remaining duration.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache store backed by moka, expiring each entry after the TTL
/// it was written with.
pub struct MemoryCacheStore {
    inner: Cache<String, CachedValue>,
}

impl MemoryCacheStore {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();
        Self { inner }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).await.map(|v| v.bytes.to_vec()))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CachedValue {
            bytes: Arc::new(value),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryCacheStore::new(100);
        store
            .set_with_ttl("London", b"payload".to_vec(), Duration::from_secs(600))
            .await
            .unwrap();

        let got = store.get("London").await.unwrap();
        assert_eq!(got, Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let store = MemoryCacheStore::new(100);
        assert_eq!(store.get("Nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_case_sensitive() {
        let store = MemoryCacheStore::new(100);
        store
            .set_with_ttl("Paris", b"upper".to_vec(), Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(store.get("paris").await.unwrap(), None);
        assert_eq!(store.get("Paris").await.unwrap(), Some(b"upper".to_vec()));
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = MemoryCacheStore::new(100);
        store
            .set_with_ttl("Tokyo", b"first".to_vec(), Duration::from_secs(600))
            .await
            .unwrap();
        store
            .set_with_ttl("Tokyo", b"second".to_vec(), Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(store.get("Tokyo").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_applies_new_ttl() {
        let store = MemoryCacheStore::new(100);
        store
            .set_with_ttl("Lima", b"first".to_vec(), Duration::from_secs(600))
            .await
            .unwrap();
        store
            .set_with_ttl("Lima", b"second".to_vec(), Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.get("Lima").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_extends_short_ttl() {
        let store = MemoryCacheStore::new(100);
        store
            .set_with_ttl("Quito", b"first".to_vec(), Duration::from_millis(50))
            .await
            .unwrap();
        store
            .set_with_ttl("Quito", b"second".to_vec(), Duration::from_secs(600))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.get("Quito").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let store = MemoryCacheStore::new(100);
        store
            .set_with_ttl("Oslo", b"stale".to_vec(), Duration::from_millis(50))
            .await
            .unwrap();

        assert!(store.get("Oslo").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.get("Oslo").await.unwrap(), None);
    }
}
