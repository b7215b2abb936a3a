use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::Report;
use crate::service::{AnalyticsService, ResolverService};
use crate::storage::StoreError;

pub struct AppState {
    pub resolver: Arc<ResolverService>,
    pub analytics: Arc<AnalyticsService>,
    pub public_base_url: String,
}

impl AppState {
    fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), code)
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct ShortenResponse {
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
}

#[derive(Serialize)]
pub struct StatItem {
    pub key: String,
    pub value: i64,
}

#[derive(Serialize)]
pub struct ClickItem {
    pub timestamp: i64,
    pub user_agent: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub original_url: String,
    pub short_url: String,
    pub total_clicks: i64,
    pub clicks_by_day: Vec<StatItem>,
    pub clicks_by_user_agent: Vec<StatItem>,
    pub recent_clicks: Vec<ClickItem>,
}

impl AnalyticsResponse {
    fn from_report(report: Report, short_url: String) -> Self {
        Self {
            original_url: report.link.original_url,
            short_url,
            total_clicks: report.total_clicks,
            clicks_by_day: report
                .clicks_by_day
                .into_iter()
                .map(|s| StatItem {
                    key: s.key,
                    value: s.value,
                })
                .collect(),
            clicks_by_user_agent: report
                .clicks_by_user_agent
                .into_iter()
                .map(|s| StatItem {
                    key: s.key,
                    value: s.value,
                })
                .collect(),
            recent_clicks: report
                .recent_clicks
                .into_iter()
                .map(|c| ClickItem {
                    timestamp: c.created_at,
                    user_agent: c.user_agent,
                })
                .collect(),
        }
    }
}

fn map_store_error(err: StoreError, not_found_msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        StoreError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: not_found_msg.to_string(),
            }),
        ),
        StoreError::Duplicate => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "original URL is already shortened".to_string(),
            }),
        ),
        StoreError::Other(err) => {
            tracing::error!(error = %err, "store operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                }),
            )
        }
    }
}

/// Create a new short URL
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), (StatusCode, Json<ErrorResponse>)> {
    if payload.url.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "URL cannot be empty".to_string(),
            }),
        ));
    }

    let link = state
        .resolver
        .create_short_url(&payload.url)
        .await
        .map_err(|err| map_store_error(err, "short URL not found"))?;

    let short_url = state.short_url(&link.short_code);
    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            original_url: link.original_url,
            short_code: link.short_code,
            short_url,
        }),
    ))
}

/// Fetch the full analytics report for a short code
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<AnalyticsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let report = state
        .analytics
        .full_report(&code)
        .await
        .map_err(|err| map_store_error(err, "no analytics for this short URL"))?;

    let short_url = state.short_url(&report.link.short_code);
    Ok(Json(AnalyticsResponse::from_report(report, short_url)))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}
