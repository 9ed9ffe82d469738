// src/utils/captcha.rs

//! Arithmetic human-verification challenges, held in memory.
//! Deterrent-grade only: a challenge is a small sum or difference.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::{
    config::{CAPTCHA_MAX_ATTEMPTS, CAPTCHA_TTL_MINUTES},
    error::AppError,
    utils::hash::sha256_hex,
};

#[derive(Debug)]
struct Challenge {
    answer_hash: String,
    attempts: u32,
    expires_at: DateTime<Utc>,
}

/// What the client gets to show the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaChallenge {
    pub ok: bool,
    pub challenge_id: String,
    pub prompt: String,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CaptchaStore {
    challenges: Arc<Mutex<HashMap<String, Challenge>>>,
}

/// Trims, lowercases and strips inner whitespace.
fn normalize_answer(answer: &str) -> String {
    answer
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl CaptchaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sweep(map: &mut HashMap<String, Challenge>, now: DateTime<Utc>) {
        map.retain(|_, challenge| challenge.expires_at > now);
    }

    pub fn create(&self) -> CaptchaChallenge {
        self.create_at(Utc::now())
    }

    fn create_at(&self, now: DateTime<Utc>) -> CaptchaChallenge {
        let mut rng = rand::thread_rng();
        let left: i32 = rng.gen_range(2..12);
        let right: i32 = rng.gen_range(2..12);
        let subtract = rng.gen_bool(0.5);

        let (prompt, answer) = if subtract {
            let (a, b) = (left.max(right), left.min(right));
            (format!("What is {} - {}?", a, b), a - b)
        } else {
            (format!("What is {} + {}?", left, right), left + right)
        };

        let id_bytes: [u8; 18] = rng.r#gen();
        let challenge_id = hex::encode(id_bytes);

        let mut map = self
            .challenges
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::sweep(&mut map, now);
        map.insert(
            challenge_id.clone(),
            Challenge {
                answer_hash: sha256_hex(&answer.to_string()),
                attempts: 0,
                expires_at: now + Duration::minutes(CAPTCHA_TTL_MINUTES),
            },
        );

        CaptchaChallenge {
            ok: true,
            challenge_id,
            prompt,
            expires_in_minutes: CAPTCHA_TTL_MINUTES,
        }
    }

    /// Checks an answer. The challenge is consumed on success, on expiry and
    /// when the attempt budget runs out.
    pub fn verify(&self, challenge_id: &str, answer: &str) -> Result<(), AppError> {
        self.verify_at(challenge_id, answer, Utc::now())
    }

    fn verify_at(
        &self,
        challenge_id: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let id = challenge_id.trim();
        let answer = normalize_answer(answer);
        if id.is_empty() || answer.is_empty() {
            return Err(AppError::BadRequest("Captcha is required.".to_string()));
        }

        let expired =
            || AppError::StartOver("Captcha expired. Press Refresh and try again.".to_string());

        let mut map = self
            .challenges
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::sweep(&mut map, now);

        let challenge = map.get_mut(id).ok_or_else(expired)?;

        if sha256_hex(&answer) != challenge.answer_hash {
            challenge.attempts += 1;
            if challenge.attempts >= CAPTCHA_MAX_ATTEMPTS {
                map.remove(id);
                return Err(AppError::StartOver(
                    "Too many failed captcha attempts. Refresh and try again.".to_string(),
                ));
            }
            return Err(AppError::BadRequest("Invalid captcha answer.".to_string()));
        }

        map.remove(id);
        Ok(())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.challenges.lock().map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    fn solve_prompt(prompt: &str) -> Option<i32> {
        let expr = prompt.strip_prefix("What is ")?.strip_suffix('?')?;
        let mut parts = expr.split_whitespace();
        let a: i32 = parts.next()?.parse().ok()?;
        let op = parts.next()?;
        let b: i32 = parts.next()?.parse().ok()?;
        match op {
            "+" => Some(a + b),
            "-" => Some(a - b),
            _ => None,
        }
    }

    #[test]
    fn prompt_answers_are_small_and_non_negative() {
        let store = CaptchaStore::new();
        for _ in 0..200 {
            let challenge = store.create();
            let answer = solve_prompt(&challenge.prompt).unwrap();
            assert!((0..=22).contains(&answer), "{}", challenge.prompt);
        }
    }

    #[test]
    fn correct_answer_passes_once() {
        let store = CaptchaStore::new();
        let challenge = store.create();
        let answer = solve_prompt(&challenge.prompt).unwrap().to_string();

        assert!(store.verify(&challenge.challenge_id, &format!(" {} ", answer)).is_ok());
        let again = store.verify(&challenge.challenge_id, &answer).unwrap_err();
        assert_eq!(again.status(), StatusCode::GONE);
    }

    #[test]
    fn attempts_are_bounded() {
        let store = CaptchaStore::new();
        let challenge = store.create();

        for _ in 0..CAPTCHA_MAX_ATTEMPTS - 1 {
            let err = store.verify(&challenge.challenge_id, "not a number").unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
        let err = store.verify(&challenge.challenge_id, "nope").unwrap_err();
        assert_eq!(err.status(), StatusCode::GONE);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn expired_challenges_are_swept() {
        let store = CaptchaStore::new();
        let issued_at = Utc::now() - Duration::minutes(CAPTCHA_TTL_MINUTES + 1);
        let challenge = store.create_at(issued_at);
        let answer = solve_prompt(&challenge.prompt).unwrap().to_string();

        let err = store
            .verify_at(&challenge.challenge_id, &answer, Utc::now())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::GONE);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn blank_input_is_a_bad_request() {
        let store = CaptchaStore::new();
        let err = store.verify("", "4").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = store.verify("abc", "   ").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
