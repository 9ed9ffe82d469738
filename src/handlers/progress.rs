// src/handlers/progress.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    course::ProgressModel,
    error::AppError,
    models::progress::{ProgressResponse, SetProgressRequest},
    utils::session::CurrentAccount,
};

/// Stored progress of an account. An account without a row is at 0.
pub async fn load_progress(pool: &SqlitePool, account_id: i64) -> Result<f64, AppError> {
    let progress = sqlx::query_scalar::<_, f64>(
        "SELECT progress FROM account_progress WHERE account_id = ?",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?;

    Ok(progress.unwrap_or(0.0))
}

pub async fn get_progress(
    State(pool): State<SqlitePool>,
    Extension(account): Extension<CurrentAccount>,
) -> Result<impl IntoResponse, AppError> {
    let progress = load_progress(&pool, account.id).await?;

    Ok(Json(json!({ "ok": true, "progress": progress })))
}

/// Overwrites the caller's progress (last writer wins).
///
/// Values must lie in [0, 100] and are stored rounded to 4 decimals.
pub async fn set_progress(
    State(pool): State<SqlitePool>,
    Extension(account): Extension<CurrentAccount>,
    payload: Result<Json<SetProgressRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let progress = payload.normalized()?;

    sqlx::query(
        r#"
        INSERT INTO account_progress (account_id, progress, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT (account_id)
        DO UPDATE SET progress = excluded.progress, updated_at = excluded.updated_at
        "#,
    )
    .bind(account.id)
    .bind(progress)
    .bind(Utc::now())
    .execute(&pool)
    .await?;

    tracing::debug!("Account {} progress set to {}", account.id, progress);

    Ok(Json(ProgressResponse {
        ok: true,
        progress,
        completed: progress >= 100.0,
    }))
}

/// Unlock snapshot for the caller's stored progress.
pub async fn my_unlocks(
    State(pool): State<SqlitePool>,
    State(model): State<Arc<ProgressModel>>,
    Extension(account): Extension<CurrentAccount>,
) -> Result<impl IntoResponse, AppError> {
    let progress = load_progress(&pool, account.id).await?;

    Ok(Json(model.snapshot(progress)))
}
