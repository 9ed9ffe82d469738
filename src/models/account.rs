// src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'accounts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: i64,

    /// Unique, stored trimmed and lowercased.
    pub email: String,

    /// Argon2 PHC string (salt + hash).
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Represents the 'pending_verifications' table in the database.
/// One row per email between registration and code confirmation.
#[derive(Debug, Clone, FromRow)]
pub struct PendingVerification {
    pub email: String,
    pub password_hash: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// DTO for starting a registration.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be at least 8 characters."
    ))]
    pub password: String,
    #[serde(default)]
    pub captcha_id: String,
    #[serde(default)]
    pub captcha_answer: String,
}

/// DTO for confirming a registration with the emailed code.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of an account, including its stored progress.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: i64,
    pub email: String,
    pub progress: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub ok: bool,
    pub verification_required: bool,
    pub email: String,
    pub expires_in_minutes: i64,
}

/// Returned by login and by a successful verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub ok: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AccountView,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub ok: bool,
    pub user: AccountView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: normalize_email(email),
            password: password.to_string(),
            captcha_id: String::new(),
            captcha_answer: String::new(),
        }
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Learner@Example.COM "), "learner@example.com");
    }

    #[test]
    fn validates_email_and_password() {
        assert!(request("learner@example.com", "password123").validate().is_ok());
        assert!(request("not-an-email", "password123").validate().is_err());
        assert!(request("learner@example.com", "short").validate().is_err());
    }
}
