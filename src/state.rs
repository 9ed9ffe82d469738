// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::course::ProgressModel;
use crate::utils::{captcha::CaptchaStore, mail::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub progress: Arc<ProgressModel>,
    pub captcha: CaptchaStore,
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ProgressModel> {
    fn from_ref(state: &AppState) -> Self {
        state.progress.clone()
    }
}

impl FromRef<AppState> for CaptchaStore {
    fn from_ref(state: &AppState) -> Self {
        state.captcha.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Mailer> {
    fn from_ref(state: &AppState) -> Self {
        state.mailer.clone()
    }
}
