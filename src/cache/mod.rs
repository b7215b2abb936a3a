pub mod memory;

use crate::models::Link;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use memory::MokaLinkCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Volatile key→link lookup with expiry. The cache is never the source of
/// truth; callers must treat any failure here as a miss and fall back to
/// the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkCache: Send + Sync {
    /// Fetch a link by short code. A missing or expired entry is
    /// [`CacheError::Miss`].
    async fn get(&self, short_code: &str) -> CacheResult<Link>;

    /// Store a link under its short code for `ttl`. Overwrites are
    /// idempotent; concurrent writers may race freely.
    async fn set(&self, link: &Link, ttl: Duration) -> CacheResult<()>;

    /// Remove an entry. Absence of the key is not an error.
    async fn delete(&self, short_code: &str) -> CacheResult<()>;
}
