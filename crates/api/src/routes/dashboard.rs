//! Dashboard render endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use dashboard::DashboardReport;

use crate::extractors::DashboardParams;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/dashboard - Full render for the requested view.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    DashboardParams(options): DashboardParams,
) -> Result<Json<DashboardReport>, ApiError> {
    let report = state.renderer.render(&options, Utc::now()).await?;
    Ok(Json(report))
}

/// GET /api/dashboard/live - Latest auto-refresh render.
pub async fn live_handler(State(state): State<AppState>) -> Result<Json<DashboardReport>, ApiError> {
    let latest = state.live.borrow().clone();

    match latest {
        Some(report) => Ok(Json(report.as_ref().clone())),
        None => Err(ApiError::not_found("REFRESH_001", "No refreshed report yet")),
    }
}
