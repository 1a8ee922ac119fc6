//! Raw session listing.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use clickhouse_client::FetchScope;
use dashboard_core::SessionRecord;
use serde::{Deserialize, Serialize};

use crate::extractors::{deserialize_timestamp, DashboardParams};
use crate::response::ApiError;
use crate::state::AppState;

/// Default page size.
const DEFAULT_LIMIT: usize = 100;

/// Hard cap on page size.
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    /// RFC 3339; send `Z` or a percent-encoded `%2B` offset
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub count: usize,
    pub sessions: Vec<SessionRecord>,
}

/// GET /api/sessions - Filtered records, newest first.
pub async fn sessions_handler(
    State(state): State<AppState>,
    DashboardParams(options): DashboardParams,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let scope = match query.since {
        Some(since) => FetchScope::Since(since),
        None => FetchScope::All,
    };

    let sessions = state.renderer.sessions(scope, &options, limit).await?;
    Ok(Json(SessionsResponse {
        count: sessions.len(),
        sessions,
    }))
}
