// src/handlers/course.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};

use crate::{course::ProgressModel, error::AppError, models::progress::UnlockQuery};

/// Returns the course layout with unit offsets and unlock thresholds.
pub async fn get_layout(State(model): State<Arc<ProgressModel>>) -> impl IntoResponse {
    Json(model.outline())
}

/// Previews what a given progress percentage unlocks.
/// Missing progress counts as 0; out-of-range values are clamped.
pub async fn preview_unlocks(
    State(model): State<Arc<ProgressModel>>,
    query: Result<Query<UnlockQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;

    Ok(Json(model.snapshot(query.progress.unwrap_or(0.0))))
}
