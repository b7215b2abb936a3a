use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tern::cache::{LinkCache, MokaLinkCache};
use tern::config::{Config, DatabaseBackend};
use tern::service::{AnalyticsService, ClickRecorder, ResolverService};
use tern::storage::{AnalyticsStore, ClickStore, LinkStore, PostgresStore, SqliteStore};
use tern::{api, redirect};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    // One store instance backs all three persistence contracts; they
    // share the same connection pool.
    let (links, clicks, analytics_store): (
        Arc<dyn LinkStore>,
        Arc<dyn ClickStore>,
        Arc<dyn AnalyticsStore>,
    ) = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.database.url);
            let store = Arc::new(
                SqliteStore::new(&config.database.url, config.database.max_connections).await?,
            );
            store.init().await?;
            (store.clone(), store.clone(), store)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage: {}", config.database.url);
            let store = Arc::new(
                PostgresStore::new(&config.database.url, config.database.max_connections).await?,
            );
            store.init().await?;
            (store.clone(), store.clone(), store)
        }
    };
    info!("Database initialized");

    let cache: Arc<dyn LinkCache> = Arc::new(MokaLinkCache::new(config.cache.max_entries));
    let cache_ttl = Duration::from_secs(config.cache.ttl_secs);

    let resolver = Arc::new(ResolverService::new(links.clone(), cache, cache_ttl));
    let recorder = Arc::new(ClickRecorder::new(
        clicks,
        config.clicks.queue_capacity,
        config.clicks.workers,
    ));
    let analytics = Arc::new(AnalyticsService::new(
        links,
        analytics_store,
        config.analytics.recent_clicks_limit,
    ));

    let api_router = api::create_api_router(
        Arc::clone(&resolver),
        analytics,
        config.public_base_url.clone(),
    );
    let redirect_router = redirect::create_redirect_router(resolver, Arc::clone(&recorder));

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("API server listening on http://{}", api_addr);

    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr).await?;
    info!("Redirect server listening on http://{}", redirect_addr);

    // Run both servers concurrently
    let result = tokio::try_join!(
        axum::serve(
            api_listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>()
        ),
        axum::serve(
            redirect_listener,
            redirect_router.into_make_service_with_connect_info::<SocketAddr>()
        ),
    );

    recorder.shutdown();
    result?;

    Ok(())
}
