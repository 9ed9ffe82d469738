// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Decimal places kept when storing a progress percentage.
pub const PROGRESS_DECIMALS: i32 = 4;

/// Lifetime of an emailed registration code.
pub const REGISTER_CODE_MINUTES: i64 = 10;
/// Wrong codes allowed before the pending registration is dropped.
pub const REGISTER_CODE_MAX_ATTEMPTS: i64 = 5;

pub const CAPTCHA_TTL_MINUTES: i64 = 5;
pub const CAPTCHA_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub session_days: i64,
    pub mail_from: String,
    /// Optional JSON file overriding the built-in course layout.
    pub course_layout_path: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let session_days = env::var("SESSION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let mail_from = env::var("MAIL_FROM")
            .unwrap_or_else(|_| "no-reply@localhost".to_string());

        let course_layout_path = env::var("COURSE_LAYOUT_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url,
            rust_log,
            bind_addr,
            session_days,
            mail_from,
            course_layout_path,
            allowed_origins,
        }
    }
}
