use crate::models::{AggregatedStat, Click, Link, NewClick, PendingLink};
use crate::storage::{AnalyticsStore, ClickStore, LinkStore, StoreError, StoreResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                original_url TEXT NOT NULL UNIQUE,
                short_code TEXT UNIQUE,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_short_code ON links(short_code)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clicks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                link_id INTEGER NOT NULL REFERENCES links(id),
                user_agent TEXT,
                ip_address TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_clicks_link_id ON clicks(link_id)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}

fn now_unix() -> StoreResult<i64> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| StoreError::Other(e.into()))?
        .as_secs() as i64;
    Ok(secs)
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn create(&self, original_url: &str) -> StoreResult<PendingLink> {
        let created_at = now_unix()?;

        let result = sqlx::query(
            r#"
            INSERT INTO links (original_url, created_at)
            VALUES (?, ?)
            ON CONFLICT(original_url) DO NOTHING
            "#,
        )
        .bind(original_url)
        .bind(created_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate);
        }

        let link = sqlx::query_as::<_, PendingLink>(
            r#"
            SELECT id, original_url, created_at
            FROM links
            WHERE original_url = ?
            "#,
        )
        .bind(original_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(link)
    }

    async fn update_code(&self, id: i64, short_code: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE links SET short_code = ? WHERE id = ?")
            .bind(short_code)
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| StoreError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn get_by_code(&self, short_code: &str) -> StoreResult<Link> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, original_url, short_code, created_at
            FROM links
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        link.ok_or(StoreError::NotFound)
    }

    async fn get_by_original_url(
        &self,
        original_url: &str,
    ) -> StoreResult<(PendingLink, Option<String>)> {
        let row = sqlx::query_as::<_, (i64, String, Option<String>, i64)>(
            r#"
            SELECT id, original_url, short_code, created_at
            FROM links
            WHERE original_url = ?
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        let (id, original_url, short_code, created_at) = row.ok_or(StoreError::NotFound)?;
        Ok((
            PendingLink {
                id,
                original_url,
                created_at,
            },
            short_code,
        ))
    }
}

#[async_trait]
impl ClickStore for SqliteStore {
    async fn create(&self, click: &NewClick) -> StoreResult<()> {
        let created_at = now_unix()?;

        sqlx::query(
            r#"
            INSERT INTO clicks (link_id, user_agent, ip_address, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(click.link_id)
        .bind(click.user_agent.as_deref())
        .bind(click.ip_address.as_deref())
        .bind(created_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for SqliteStore {
    async fn clicks_by_day(&self, link_id: i64) -> StoreResult<Vec<AggregatedStat>> {
        let stats = sqlx::query_as::<_, AggregatedStat>(
            r#"
            SELECT strftime('%Y-%m-%d', created_at, 'unixepoch') AS key, COUNT(*) AS value
            FROM clicks
            WHERE link_id = ?
            GROUP BY key
            ORDER BY key ASC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(stats)
    }

    async fn clicks_by_user_agent(&self, link_id: i64) -> StoreResult<Vec<AggregatedStat>> {
        let stats = sqlx::query_as::<_, AggregatedStat>(
            r#"
            SELECT COALESCE(user_agent, 'unknown') AS key, COUNT(*) AS value
            FROM clicks
            WHERE link_id = ?
            GROUP BY key
            ORDER BY value DESC, key ASC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(stats)
    }

    async fn recent_clicks(&self, link_id: i64, limit: i64) -> StoreResult<Vec<Click>> {
        let clicks = sqlx::query_as::<_, Click>(
            r#"
            SELECT id, link_id, user_agent, ip_address, created_at
            FROM clicks
            WHERE link_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(clicks)
    }
}
