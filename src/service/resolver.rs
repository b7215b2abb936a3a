use crate::cache::{CacheError, LinkCache};
use crate::encoder;
use crate::models::Link;
use crate::storage::{LinkStore, StoreError, StoreResult};
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates link creation and cache-aside lookup.
///
/// The cache is purely an accelerator: every cache failure degrades to a
/// store round-trip and is logged, never surfaced. Store sentinel errors
/// (`NotFound`, `Duplicate`) propagate to the caller unchanged.
pub struct ResolverService {
    links: Arc<dyn LinkStore>,
    cache: Arc<dyn LinkCache>,
    cache_ttl: Duration,
}

impl ResolverService {
    pub fn new(links: Arc<dyn LinkStore>, cache: Arc<dyn LinkCache>, cache_ttl: Duration) -> Self {
        Self {
            links,
            cache,
            cache_ttl,
        }
    }

    /// Two-phase creation: insert the bare URL to obtain an id, derive the
    /// code from that id, write the code back, then best-effort warm the
    /// cache.
    ///
    /// A row that previously lost its code write-back is repaired here:
    /// the insert reports a duplicate, the existing row turns out to be
    /// uncoded, and the same code is re-derived from the same id. A
    /// duplicate of a fully coded row propagates `Duplicate` untouched.
    pub async fn create_short_url(&self, original_url: &str) -> StoreResult<Link> {
        let link = match self.links.create(original_url).await {
            Ok(pending) => {
                let code = encoder::encode(pending.id as u64);
                self.links.update_code(pending.id, &code).await?;
                tracing::info!(short_code = %code, link_id = pending.id, "created short url");
                pending.with_code(code)
            }
            Err(StoreError::Duplicate) => self.complete_existing(original_url).await?,
            Err(err) => return Err(err),
        };

        self.warm_cache(&link).await;
        Ok(link)
    }

    /// Cache-aside lookup. Concurrent misses are not deduplicated; each
    /// in-flight miss may hit the store and rewrite the cache, which is
    /// safe because cache writes are idempotent overwrites.
    pub async fn resolve(&self, short_code: &str) -> StoreResult<Link> {
        match self.cache.get(short_code).await {
            Ok(link) => {
                tracing::debug!(short_code, "cache hit");
                return Ok(link);
            }
            Err(CacheError::Miss) => {
                tracing::debug!(short_code, "cache miss");
            }
            Err(err) => {
                tracing::warn!(short_code, error = %err, "cache get failed, falling back to store");
            }
        }

        let link = self.links.get_by_code(short_code).await?;
        self.warm_cache(&link).await;
        Ok(link)
    }

    async fn complete_existing(&self, original_url: &str) -> StoreResult<Link> {
        let (pending, short_code) = self.links.get_by_original_url(original_url).await?;
        match short_code {
            Some(_) => Err(StoreError::Duplicate),
            None => {
                // Some earlier call died between insert and write-back.
                // The encoder is deterministic, so the same id re-derives
                // the same code and the write-back is idempotent.
                let code = encoder::encode(pending.id as u64);
                self.links.update_code(pending.id, &code).await?;
                tracing::info!(short_code = %code, link_id = pending.id, "repaired uncoded link");
                Ok(pending.with_code(code))
            }
        }
    }

    async fn warm_cache(&self, link: &Link) {
        if let Err(err) = self.cache.set(link, self.cache_ttl).await {
            tracing::warn!(short_code = %link.short_code, error = %err, "failed to warm cache");
        }
    }
}
