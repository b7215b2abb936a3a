use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::service::{AnalyticsService, ResolverService};

use super::handlers::{get_analytics, health_check, shorten_url, AppState};

pub fn create_api_router(
    resolver: Arc<ResolverService>,
    analytics: Arc<AnalyticsService>,
    public_base_url: String,
) -> Router {
    let state = Arc::new(AppState {
        resolver,
        analytics,
        public_base_url,
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/shorten", post(shorten_url))
        .route("/api/v1/analytics/{code}", get(get_analytics))
        .with_state(state)
}
