use crate::models::{AggregatedStat, Click, Link, NewClick, PendingLink};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("duplicate record")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for links. The store is the source of truth; ids
/// are assigned monotonically and never reused.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Insert a row holding only the original URL and return it uncoded.
    /// Fails with [`StoreError::Duplicate`] when the URL already exists.
    async fn create(&self, original_url: &str) -> StoreResult<PendingLink>;

    /// Write the derived short code back onto an existing row.
    async fn update_code(&self, id: i64, short_code: &str) -> StoreResult<()>;

    /// Fetch a link by its short code. Fails with [`StoreError::NotFound`]
    /// when no coded row carries it.
    async fn get_by_code(&self, short_code: &str) -> StoreResult<Link>;

    /// Fetch a row by original URL, coded or not. Serves the repair path
    /// for rows that lost their code write-back.
    async fn get_by_original_url(
        &self,
        original_url: &str,
    ) -> StoreResult<(PendingLink, Option<String>)>;
}

/// Persistence contract for click events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStore: Send + Sync {
    async fn create(&self, click: &NewClick) -> StoreResult<()>;
}

/// Read-side analytics queries, all scoped to one link id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Click counts bucketed by calendar day, oldest bucket first.
    async fn clicks_by_day(&self, link_id: i64) -> StoreResult<Vec<AggregatedStat>>;

    /// Click counts grouped by user-agent string, highest count first.
    async fn clicks_by_user_agent(&self, link_id: i64) -> StoreResult<Vec<AggregatedStat>>;

    /// The most recent raw click events, newest first, capped at `limit`.
    async fn recent_clicks(&self, link_id: i64, limit: i64) -> StoreResult<Vec<Click>>;
}
