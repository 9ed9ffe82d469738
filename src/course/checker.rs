// src/course/checker.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::course::answers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// No answer record for the identifier.
    UnknownId(String),
    /// The submission's shape does not match the answer record.
    Malformed(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::UnknownId(msg) | CheckError::Malformed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CheckError {}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub quiz_id: String,
    pub all_correct: bool,
    pub wrong_count: usize,
    pub total: usize,
    pub correct_by_question: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DragAndDropOutcome {
    pub exercise_id: String,
    pub all_correct: bool,
    pub wrong_count: usize,
    pub total: usize,
    pub correct_by_index: Vec<bool>,
}

/// Only an exact, case-sensitive string match counts. Null, missing and
/// non-string values are wrong.
fn is_match(submitted: Option<&Value>, expected: &str) -> bool {
    submitted.and_then(Value::as_str) == Some(expected)
}

/// Checks a quiz submission (a JSON object of question id -> option).
///
/// Every expected question is graded; extra keys are ignored.
pub fn check_quiz(quiz_id: &str, submission: &Value) -> Result<QuizOutcome, CheckError> {
    let expected = answers::quiz(quiz_id)
        .ok_or_else(|| CheckError::UnknownId(format!("Unknown quizId '{}'", quiz_id)))?;

    let submitted = submission.as_object().ok_or_else(|| {
        CheckError::Malformed("Expected answers to be an object keyed by question id".to_string())
    })?;

    let correct_by_question: BTreeMap<String, bool> = expected
        .iter()
        .map(|(question, answer)| {
            (
                question.to_string(),
                is_match(submitted.get(*question), answer),
            )
        })
        .collect();

    let wrong_count = correct_by_question.values().filter(|ok| !**ok).count();

    Ok(QuizOutcome {
        quiz_id: quiz_id.to_string(),
        all_correct: wrong_count == 0,
        wrong_count,
        total: expected.len(),
        correct_by_question,
    })
}

/// Checks a drag-and-drop submission (a JSON array, one entry per blank).
pub fn check_drag_and_drop(
    exercise_id: &str,
    submission: &Value,
) -> Result<DragAndDropOutcome, CheckError> {
    let expected = answers::drag_and_drop(exercise_id)
        .ok_or_else(|| CheckError::UnknownId(format!("Unknown exerciseId '{}'", exercise_id)))?;

    let submitted = submission
        .as_array()
        .ok_or_else(|| CheckError::Malformed("Expected answers to be an array".to_string()))?;

    if submitted.len() != expected.len() {
        return Err(CheckError::Malformed(format!(
            "Answers length mismatch: expected {}, got {}",
            expected.len(),
            submitted.len()
        )));
    }

    let correct_by_index: Vec<bool> = expected
        .iter()
        .zip(submitted)
        .map(|(answer, given)| is_match(Some(given), answer))
        .collect();

    let wrong_count = correct_by_index.iter().filter(|ok| !**ok).count();

    Ok(DragAndDropOutcome {
        exercise_id: exercise_id.to_string(),
        all_correct: wrong_count == 0,
        wrong_count,
        total: expected.len(),
        correct_by_index,
    })
}
