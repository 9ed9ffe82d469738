// src/course/writing.rs

//! Rubric scoring for the short e-mail writing tasks.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::course::checker::CheckError;

enum Matcher {
    /// At least one phrase appears (case-insensitive substring).
    AnyPhrase(&'static [&'static str]),
    /// Every phrase appears (case-insensitive substring).
    AllPhrases(&'static [&'static str]),
    /// At least one pattern matches.
    AnyPattern(Vec<Regex>),
}

impl Matcher {
    fn is_met(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        match self {
            Matcher::AnyPhrase(phrases) => phrases.iter().any(|p| lowered.contains(p)),
            Matcher::AllPhrases(phrases) => phrases.iter().all(|p| lowered.contains(p)),
            Matcher::AnyPattern(patterns) => patterns.iter().any(|re| re.is_match(text)),
        }
    }
}

struct RubricPoint {
    hint: &'static str,
    matcher: Matcher,
}

struct WordTarget {
    /// Word counts in this range earn `points`.
    range: RangeInclusive<usize>,
    points: u32,
    /// Points for a non-empty answer shorter than the range.
    short_points: u32,
}

struct WritingTask {
    id: &'static str,
    max_words: usize,
    points: Vec<RubricPoint>,
    words: WordTarget,
    /// Points for the form checks: full with no issue, one less with up to two.
    form_points: u32,
    strong_at: u32,
    partial_at: u32,
}

impl WritingTask {
    fn max_score(&self) -> u32 {
        self.points.len() as u32 + self.words.points + self.form_points
    }
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| Regex::new(source).expect("writing rubric pattern must compile"))
        .collect()
}

const MONTH: &str = "(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec|january|february|march|april|june|july|august|september|october|november|december)";

static TASKS: LazyLock<Vec<WritingTask>> = LazyLock::new(|| {
    let day_month = format!(r"(?i)\b\d{{1,2}}\s+{}\b", MONTH);
    let month_day = format!(r"(?i)\b{}\s+\d{{1,2}}\b", MONTH);

    vec![
        WritingTask {
            id: "module1_h2_writing_task2",
            max_words: 50,
            points: vec![
                RubricPoint {
                    hint: "Mention: Rethymno, Crete.",
                    matcher: Matcher::AllPhrases(&["rethymno", "crete"]),
                },
                RubricPoint {
                    hint: "Mention: family room.",
                    matcher: Matcher::AnyPhrase(&[
                        "family room",
                        "family-room",
                        "family accommodation",
                        "family",
                    ]),
                },
                RubricPoint {
                    hint: "Ask for: breakfast rates.",
                    matcher: Matcher::AnyPhrase(&[
                        "breakfast rates",
                        "breakfast",
                        "rates",
                        "price",
                        "prices",
                    ]),
                },
                RubricPoint {
                    hint: "Include: dates (from ... to ...).",
                    matcher: Matcher::AnyPattern(patterns(&[
                        r"\b\d{1,2}[/\-]\d{1,2}([/\-]\d{2,4})?\b",
                        day_month.as_str(),
                        month_day.as_str(),
                        r"(?is)\bfrom\b.{0,40}\bto\b",
                    ])),
                },
                RubricPoint {
                    hint: "Include: number of days or nights.",
                    matcher: Matcher::AnyPattern(patterns(&[
                        r"(?i)\b\d+\s*(day|days|night|nights)\b",
                    ])),
                },
                RubricPoint {
                    hint: "Use a polite request phrase (e.g., \"Could you please...\").",
                    matcher: Matcher::AnyPhrase(&[
                        "would like",
                        "could you",
                        "please",
                        "i would like",
                    ]),
                },
            ],
            words: WordTarget {
                range: 35..=50,
                points: 2,
                short_points: 1,
            },
            form_points: 2,
            strong_at: 8,
            partial_at: 5,
        },
        WritingTask {
            id: "mini_mock_writing_2",
            max_words: 50,
            points: vec![
                RubricPoint {
                    hint: "Mention expected arrival/departure dates.",
                    matcher: Matcher::AnyPhrase(&[
                        "date",
                        "dates",
                        "from",
                        "to",
                        "arrive",
                        "arrival",
                        "departure",
                        "check-in",
                        "check-out",
                    ]),
                },
                RubricPoint {
                    hint: "Reassure her about dietary requests.",
                    matcher: Matcher::AnyPhrase(&[
                        "dietary",
                        "gluten",
                        "allergy",
                        "meal request",
                        "special request",
                        "food request",
                    ]),
                },
                RubricPoint {
                    hint: "Confirm private beach privileges/access.",
                    matcher: Matcher::AnyPhrase(&[
                        "private beach",
                        "beach access",
                        "beach privileges",
                        "private shore",
                    ]),
                },
                RubricPoint {
                    hint: "Use a confirmation/reassurance phrase.",
                    matcher: Matcher::AnyPhrase(&[
                        "we confirm",
                        "confirmed",
                        "please be assured",
                        "rest assured",
                        "we will",
                        "we are happy to",
                    ]),
                },
            ],
            words: WordTarget {
                range: 45..=50,
                points: 1,
                short_points: 0,
            },
            form_points: 0,
            strong_at: 5,
            partial_at: 3,
        },
    ]
});

static FORM_CHECKS: LazyLock<FormChecks> = LazyLock::new(FormChecks::new);

struct FormChecks {
    ends_with_punctuation: Regex,
    lowercase_i: Regex,
    capital_i: Regex,
    double_space: Regex,
    greeting: Regex,
    thanks: Regex,
    closing: Regex,
}

impl FormChecks {
    fn new() -> Self {
        let re = |source: &str| Regex::new(source).expect("form check pattern must compile");
        Self {
            ends_with_punctuation: re(r"[.!?]$"),
            lowercase_i: re(r"\bi\b"),
            capital_i: re(r"\bI\b"),
            double_space: re(r"\s{2,}"),
            greeting: re(r"(?i)\b(dear|hello|hi)\b"),
            thanks: re(r"(?i)\b(thank|thanks)\b"),
            closing: re(r"(?i)\b(sincerely|kind regards|regards)\b"),
        }
    }

    fn issues(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut issues = Vec::new();
        if !self.ends_with_punctuation.is_match(text) {
            issues.push("Add a full stop at the end.");
        }
        if self.lowercase_i.is_match(text) && !self.capital_i.is_match(text) {
            issues.push("Use capital \"I\".");
        }
        if self.double_space.is_match(text) {
            issues.push("Remove extra spaces.");
        }
        if !self.greeting.is_match(text) {
            issues.push("Add a greeting (e.g., Dear Sir/Madam).");
        }
        if !self.thanks.is_match(text) {
            issues.push("Add a closing thanks.");
        }
        if !self.closing.is_match(text) {
            issues.push("Add a polite closing (Kind regards, ...).");
        }
        issues.into_iter().map(String::from).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Strong,
    Partial,
    Revise,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WritingReport {
    pub task_id: String,
    pub score: u32,
    pub max_score: u32,
    pub word_count: usize,
    pub max_words: usize,
    pub band: Band,
    /// Missing content points and word-count advice.
    pub notes: Vec<String>,
    /// Form and basic writing issues.
    pub issues: Vec<String>,
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn task_ids() -> impl Iterator<Item = &'static str> {
    TASKS.iter().map(|task| task.id)
}

/// Scores a free-text answer against the task's rubric.
pub fn check_writing(task_id: &str, text: &str) -> Result<WritingReport, CheckError> {
    let task = TASKS
        .iter()
        .find(|task| task.id == task_id)
        .ok_or_else(|| CheckError::UnknownId(format!("Unknown taskId '{}'", task_id)))?;

    let mut score = 0;
    let mut notes = Vec::new();

    for point in &task.points {
        if point.matcher.is_met(text) {
            score += 1;
        } else {
            notes.push(point.hint.to_string());
        }
    }

    let word_count = count_words(text);
    let target = &task.words;
    if word_count == 0 {
        notes.push("Write your answer first.".to_string());
    } else if target.range.contains(&word_count) {
        score += target.points;
    } else if word_count < *target.range.start() {
        score += target.short_points;
        notes.push(format!(
            "Try to write a bit more (aim for {}-{} words).",
            target.range.start(),
            target.range.end()
        ));
    } else {
        notes.push(format!("Over {} words (trim your answer).", target.range.end()));
    }

    let issues = if task.form_points > 0 {
        let issues = FORM_CHECKS.issues(text);
        if issues.is_empty() {
            score += task.form_points;
        } else if issues.len() <= 2 {
            score += task.form_points - 1;
        }
        issues
    } else {
        Vec::new()
    };

    let band = if score >= task.strong_at {
        Band::Strong
    } else if score >= task.partial_at {
        Band::Partial
    } else {
        Band::Revise
    };

    Ok(WritingReport {
        task_id: task.id.to_string(),
        score,
        max_score: task.max_score(),
        word_count,
        max_words: task.max_words,
        band,
        notes,
        issues,
    })
}
