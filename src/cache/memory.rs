use crate::cache::{CacheError, CacheResult, LinkCache};
use crate::models::Link;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

/// Expiry policy that reads the TTL stored alongside each entry, so the
/// per-call TTL on [`LinkCache::set`] is honored.
struct PerEntryTtl;

impl Expiry<String, (Link, Duration)> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(Link, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-process moka-backed link cache.
pub struct MokaLinkCache {
    entries: Cache<String, (Link, Duration)>,
}

impl MokaLinkCache {
    pub fn new(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }
}

#[async_trait]
impl LinkCache for MokaLinkCache {
    async fn get(&self, short_code: &str) -> CacheResult<Link> {
        match self.entries.get(short_code).await {
            Some((link, _)) => Ok(link),
            None => Err(CacheError::Miss),
        }
    }

    async fn set(&self, link: &Link, ttl: Duration) -> CacheResult<()> {
        self.entries
            .insert(link.short_code.clone(), (link.clone(), ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, short_code: &str) -> CacheResult<()> {
        self.entries.invalidate(short_code).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(code: &str) -> Link {
        Link {
            id: 1,
            original_url: "https://example.com".to_string(),
            short_code: code.to_string(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MokaLinkCache::new(16);
        cache
            .set(&link("abc"), Duration::from_secs(60))
            .await
            .unwrap();

        let got = cache.get("abc").await.unwrap();
        assert_eq!(got.short_code, "abc");
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let cache = MokaLinkCache::new(16);
        assert!(matches!(cache.get("nope").await, Err(CacheError::Miss)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MokaLinkCache::new(16);
        cache
            .set(&link("abc"), Duration::from_secs(60))
            .await
            .unwrap();

        cache.delete("abc").await.unwrap();
        cache.delete("abc").await.unwrap();
        assert!(matches!(cache.get("abc").await, Err(CacheError::Miss)));
    }

    #[tokio::test]
    async fn entries_expire_after_their_ttl() {
        let cache = MokaLinkCache::new(16);
        cache
            .set(&link("abc"), Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(matches!(cache.get("abc").await, Err(CacheError::Miss)));
    }
}
