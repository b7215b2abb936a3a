use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::models::NewClick;
use crate::service::{ClickRecorder, ResolverService};
use crate::storage::StoreError;

pub struct RedirectState {
    pub resolver: Arc<ResolverService>,
    pub clicks: Arc<ClickRecorder>,
}

/// Redirect to the original URL, recording the click off the hot path.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state.resolver.resolve(&code).await {
        Ok(link) => {
            let user_agent = headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            // The response never waits on this; the queue drops under
            // pressure rather than slowing redirects.
            state.clicks.record(NewClick {
                link_id: link.id,
                user_agent,
                ip_address: Some(addr.ip().to_string()),
            });

            Redirect::permanent(&link.original_url).into_response()
        }
        Err(StoreError::NotFound) => (StatusCode::NOT_FOUND, "short URL not found").into_response(),
        Err(err) => {
            tracing::error!(short_code = %code, error = %err, "failed to resolve short URL");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
