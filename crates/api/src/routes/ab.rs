//! Experiment panel endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use dashboard_core::{AbPanel, VariantField};

use crate::extractors::DashboardParams;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/ab/:field - One experiment panel over the filtered window.
pub async fn ab_handler(
    State(state): State<AppState>,
    Path(field): Path<String>,
    DashboardParams(options): DashboardParams,
) -> Result<Json<AbPanel>, ApiError> {
    let field: VariantField = field.parse()?;
    let panel = state.renderer.ab_panel(&options, field, Utc::now()).await?;
    Ok(Json(panel))
}
