// src/course/answers.rs

//! Expected answers for every checkable activity.
//! The tables never leave the server; clients only see per-item verdicts.

/// Quiz id -> (question id, expected option) pairs.
const QUIZZES: &[(&str, &[(&str, &str)])] = &[
    (
        "module1_useful_language",
        &[("m1q1", "a"), ("m1q2", "a"), ("m1q3", "a"), ("m1q4", "a"), ("m1q5", "a")],
    ),
    ("module1_listening", &[("lq1", "b"), ("lq2", "b"), ("lq3", "b")]),
    ("module1_reading", &[("r1", "b"), ("r2", "a"), ("r3", "a")]),
    ("module1_h2_listening", &[("h2lq1", "a"), ("h2lq2", "c"), ("h2lq3", "a")]),
    ("module1_h2_reading", &[("h2r1", "b"), ("h2r2", "a"), ("h2r3", "c")]),
    ("module2_useful_language", &[("q1", "a"), ("q2", "a"), ("q3", "a")]),
    ("module2_listening", &[("lq1", "b"), ("lq2", "a"), ("lq3", "b")]),
    ("module2_h2_listening", &[("h2lq1", "b"), ("h2lq2", "c"), ("h2lq3", "a")]),
    ("module2_reading", &[("r1", "c"), ("r2", "c"), ("r3", "c")]),
    ("module2_h2_reading", &[("h2r1", "a"), ("h2r2", "b"), ("h2r3", "a")]),
    ("module3_keywords_listening", &[("m3kq1", "b"), ("m3kq2", "a"), ("m3kq3", "c")]),
    ("mini_mock_listening_1a", &[("mq1", "b"), ("mq2", "c")]),
    ("mini_mock_listening_1b", &[("mq3", "a"), ("mq4", "b"), ("mq5", "c")]),
    (
        "mini_mock_reading_1",
        &[("mqr1", "b"), ("mqr2", "a"), ("mqr3", "b"), ("mqr4", "b")],
    ),
    (
        "mini_mock_reading_2",
        &[("mqrb5", "a"), ("mqrb6", "c"), ("mqrb7", "b"), ("mqrb8", "a")],
    ),
];

/// Drag-and-drop exercise id -> expected token per blank, in order.
const DRAG_AND_DROP: &[(&str, &[&str])] = &[
    ("module1_practice", &["are", "in", "like", "prefer", "she", "this", "glad"]),
    ("module1_speaking", &["d", "f", "a", "b", "c", "e"]),
    ("module1_h2_keywords", &["F", "C", "E", "A", "D", "B"]),
    ("module1_h2_writing_task1", &["flight", "visit", "island", "travel", "ferry"]),
    ("module2_practice", &["doesn't like", "she", "likes", "do", "flies"]),
    ("module2_speaking", &["c", "d", "b", "f", "a", "e"]),
    ("module2_h2_keywords", &["E", "C", "B", "D", "F", "A"]),
    ("module2_h2_writing_task1", &["rates", "reservations", "beginning", "prices"]),
    ("module3_activity2", &["C", "F", "A", "D", "E", "B"]),
    ("mini_mock_writing_1", &["manners", "warm", "respect", "team"]),
];

/// Expected answers of one quiz, keyed by question id.
pub fn quiz(quiz_id: &str) -> Option<&'static [(&'static str, &'static str)]> {
    QUIZZES
        .iter()
        .find(|(id, _)| *id == quiz_id)
        .map(|(_, answers)| *answers)
}

/// Expected tokens of one drag-and-drop exercise, one per blank.
pub fn drag_and_drop(exercise_id: &str) -> Option<&'static [&'static str]> {
    DRAG_AND_DROP
        .iter()
        .find(|(id, _)| *id == exercise_id)
        .map(|(_, answers)| *answers)
}

pub fn quiz_ids() -> impl Iterator<Item = &'static str> {
    QUIZZES.iter().map(|(id, _)| *id)
}

pub fn drag_and_drop_ids() -> impl Iterator<Item = &'static str> {
    DRAG_AND_DROP.iter().map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique_across_both_tables() {
        let mut seen = HashSet::new();
        for id in quiz_ids().chain(drag_and_drop_ids()) {
            assert!(seen.insert(id), "duplicate id {}", id);
        }
    }

    #[test]
    fn question_ids_are_unique_within_a_quiz() {
        for id in quiz_ids() {
            let questions = quiz(id).unwrap();
            let unique: HashSet<_> = questions.iter().map(|(q, _)| *q).collect();
            assert_eq!(unique.len(), questions.len(), "quiz {}", id);
        }
    }

    #[test]
    fn lookups_miss_for_unknown_ids() {
        assert!(quiz("module99_quiz").is_none());
        assert!(drag_and_drop("module2_useful_language").is_none());
        assert!(quiz("module2_speaking").is_none());
    }
}
