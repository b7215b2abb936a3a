pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use trait_def::{AnalyticsStore, ClickStore, LinkStore, StoreError, StoreResult};

#[cfg(test)]
pub use trait_def::{MockAnalyticsStore, MockLinkStore};
