// src/handlers/check.rs

use axum::{Json, extract::rejection::JsonRejection, response::IntoResponse};

use crate::{
    course::{checker, writing},
    error::AppError,
    models::check::{DragAndDropCheckRequest, QuizCheckRequest, WritingCheckRequest},
};

/// Checks a quiz submission against the answer key.
///
/// Unknown quiz ids give 404, a non-object `answers` gives 400.
pub async fn check_quiz(
    payload: Result<Json<QuizCheckRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let outcome = checker::check_quiz(&payload.quiz_id, &payload.answers)?;
    tracing::debug!(
        "Quiz {} checked: {}/{} wrong",
        outcome.quiz_id,
        outcome.wrong_count,
        outcome.total
    );

    Ok(Json(outcome))
}

/// Checks an ordered drag-and-drop submission.
pub async fn check_drag_and_drop(
    payload: Result<Json<DragAndDropCheckRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let outcome = checker::check_drag_and_drop(&payload.exercise_id, &payload.answers)?;

    Ok(Json(outcome))
}

pub async fn check_writing(
    payload: Result<Json<WritingCheckRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let report = writing::check_writing(&payload.task_id, &payload.text)?;

    Ok(Json(report))
}
