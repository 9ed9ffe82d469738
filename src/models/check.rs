// src/models/check.rs

use serde::Deserialize;
use serde_json::Value;

/// DTO for `POST /api/check-quiz`.
/// `answers` stays untyped so a wrong shape is reported by the checker.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCheckRequest {
    pub quiz_id: String,
    pub answers: Value,
}

/// DTO for `POST /api/check-dnd`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragAndDropCheckRequest {
    pub exercise_id: String,
    pub answers: Value,
}

/// DTO for `POST /api/check-writing`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingCheckRequest {
    pub task_id: String,
    #[serde(default)]
    pub text: String,
}
