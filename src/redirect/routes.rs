use axum::{routing::get, Router};
use std::sync::Arc;

use crate::service::{ClickRecorder, ResolverService};

use super::handlers::{health_check, redirect_url, RedirectState};

pub fn create_redirect_router(
    resolver: Arc<ResolverService>,
    clicks: Arc<ClickRecorder>,
) -> Router {
    let state = Arc::new(RedirectState { resolver, clicks });

    Router::new()
        .route("/", get(health_check))
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
