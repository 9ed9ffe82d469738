// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{Config, REGISTER_CODE_MAX_ATTEMPTS, REGISTER_CODE_MINUTES},
    error::AppError,
    handlers::progress::load_progress,
    models::account::{
        Account, AccountView, LoginRequest, MeResponse, PendingVerification, RegisterRequest,
        RegisterResponse, SessionResponse, VerifyRequest, normalize_email,
    },
    utils::{
        captcha::CaptchaStore,
        hash::{hash_password, sha256_hex, verify_dummy_password, verify_password},
        mail::{Mailer, VerificationEmail},
        session::{CurrentAccount, bearer_token, create_session, delete_session},
        verification::{generate_code, is_valid_code_format},
    },
};

/// Issues a fresh arithmetic captcha for the registration form.
pub async fn captcha_challenge(State(captcha): State<CaptchaStore>) -> impl IntoResponse {
    Json(captcha.create())
}

/// Starts a registration.
///
/// Validates the credentials and the captcha, stores a pending verification
/// (replacing any earlier one for the same email) and mails a 6-digit code.
/// If the mail cannot be sent the pending row is removed again and 502 is returned.
pub async fn register(
    State(pool): State<SqlitePool>,
    State(captcha): State<CaptchaStore>,
    State(mailer): State<Arc<dyn Mailer>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    payload.email = normalize_email(&payload.email);

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    captcha.verify(&payload.captcha_id, &payload.captcha_answer)?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists.".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let code = generate_code();
    let now = Utc::now();
    let expires_at = now + Duration::minutes(REGISTER_CODE_MINUTES);

    sqlx::query(
        r#"
        INSERT INTO pending_verifications (email, password_hash, code_hash, expires_at, attempts, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        ON CONFLICT (email)
        DO UPDATE SET
            password_hash = excluded.password_hash,
            code_hash = excluded.code_hash,
            expires_at = excluded.expires_at,
            attempts = 0,
            created_at = excluded.created_at
        "#,
    )
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(sha256_hex(&code))
    .bind(expires_at)
    .bind(now)
    .execute(&pool)
    .await?;

    let email = VerificationEmail::new(&payload.email, &code, REGISTER_CODE_MINUTES);
    if let Err(e) = mailer.send(email).await {
        tracing::warn!("Verification mail to {} failed: {}", payload.email, e);
        if let Err(cleanup) = delete_pending(&pool, &payload.email).await {
            tracing::error!("Failed to drop pending verification: {:?}", cleanup);
        }
        return Err(AppError::Upstream(format!("Email sending failed: {}", e)));
    }

    tracing::info!("Verification code sent to {}", payload.email);

    Ok(Json(RegisterResponse {
        ok: true,
        verification_required: true,
        email: payload.email,
        expires_in_minutes: REGISTER_CODE_MINUTES,
    }))
}

/// Confirms a registration with the emailed code.
///
/// Creates the account and its progress row, drops the pending row and
/// returns 201 with a new session.
pub async fn register_verify(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);
    let code = payload.code.trim();

    if email.is_empty() || code.is_empty() {
        return Err(AppError::BadRequest(
            "Email and verification code are required.".to_string(),
        ));
    }
    if !is_valid_code_format(code) {
        return Err(AppError::BadRequest(
            "Verification code must be 6 digits.".to_string(),
        ));
    }

    let pending = sqlx::query_as::<_, PendingVerification>(
        r#"
        SELECT email, password_hash, code_hash, expires_at, attempts
        FROM pending_verifications
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::BadRequest("No pending verification for this email.".to_string()))?;

    if pending.expires_at <= Utc::now() {
        drop_pending_code(&pool, &pending).await?;
        return Err(AppError::StartOver(
            "Verification code expired. Request a new one.".to_string(),
        ));
    }

    if sha256_hex(code) != pending.code_hash {
        // Incremented in place: concurrent guesses each see a distinct count.
        let attempts = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE pending_verifications
            SET attempts = attempts + 1
            WHERE email = ? AND code_hash = ?
            RETURNING attempts
            "#,
        )
        .bind(&email)
        .bind(&pending.code_hash)
        .fetch_optional(&pool)
        .await?;

        return match attempts {
            Some(attempts) if attempts < REGISTER_CODE_MAX_ATTEMPTS => Err(AppError::BadRequest(
                "Invalid verification code.".to_string(),
            )),
            Some(_) => {
                drop_pending_code(&pool, &pending).await?;
                Err(too_many_attempts())
            }
            // Another request already exhausted or consumed this code
            None => Err(too_many_attempts()),
        };
    }

    let account_id = finalize_registration(&pool, &pending).await?;
    let session = create_session(&pool, account_id, config.session_days).await?;

    tracing::info!("Account {} registered", account_id);

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            ok: true,
            token: session.token,
            expires_at: session.expires_at,
            user: AccountView {
                id: account_id,
                email,
                progress: 0.0,
            },
        }),
    ))
}

/// Authenticates an account and opens a session.
///
/// Unknown email and wrong password give the same 401.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(&pool)
    .await?;

    let Some(account) = account else {
        verify_dummy_password(&payload.password);
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&payload.password, &account.password_hash)? {
        return Err(AppError::invalid_credentials());
    }

    let progress = load_progress(&pool, account.id).await?;
    let session = create_session(&pool, account.id, config.session_days).await?;

    Ok(Json(SessionResponse {
        ok: true,
        token: session.token,
        expires_at: session.expires_at,
        user: AccountView {
            id: account.id,
            email: account.email,
            progress,
        },
    }))
}

/// Returns the authenticated account with its stored progress.
pub async fn me(
    State(pool): State<SqlitePool>,
    Extension(account): Extension<CurrentAccount>,
) -> Result<impl IntoResponse, AppError> {
    let progress = load_progress(&pool, account.id).await?;

    Ok(Json(MeResponse {
        ok: true,
        user: AccountView {
            id: account.id,
            email: account.email,
            progress,
        },
    }))
}

/// Destroys the presented session. Without a token this is a no-op.
pub async fn logout(
    State(pool): State<SqlitePool>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = bearer_token(&headers) {
        delete_session(&pool, &sha256_hex(&token)).await?;
    }

    Ok(Json(json!({ "ok": true })))
}

async fn delete_pending(pool: &SqlitePool, email: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM pending_verifications WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}

fn too_many_attempts() -> AppError {
    AppError::StartOver("Too many failed attempts. Request a new code.".to_string())
}

/// Removes the pending row only while it still carries this code.
async fn drop_pending_code(pool: &SqlitePool, pending: &PendingVerification) -> Result<(), AppError> {
    sqlx::query("DELETE FROM pending_verifications WHERE email = ? AND code_hash = ?")
        .bind(&pending.email)
        .bind(&pending.code_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Pending-row removal, account row and progress row commit together.
async fn finalize_registration(
    pool: &SqlitePool,
    pending: &PendingVerification,
) -> Result<i64, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    // Claim the pending row first; a code that was exhausted or used meanwhile is rejected.
    let claimed = sqlx::query(
        r#"
        DELETE FROM pending_verifications
        WHERE email = ? AND code_hash = ? AND attempts < ?
        "#,
    )
    .bind(&pending.email)
    .bind(&pending.code_hash)
    .bind(REGISTER_CODE_MAX_ATTEMPTS)
    .execute(&mut *tx)
    .await?;
    if claimed.rows_affected() == 0 {
        return Err(AppError::StartOver(
            "Verification code is no longer valid. Request a new one.".to_string(),
        ));
    }

    let account_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO accounts (email, password_hash, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&pending.email)
    .bind(&pending.password_hash)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let account_id = match account_id {
        Ok(id) => id,
        Err(e) => {
            // Puts the pending row back
            tx.rollback().await?;
            return Err(match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::Conflict("Email already exists.".to_string())
                }
                other => {
                    tracing::error!("Failed to create account: {:?}", other);
                    AppError::from(other)
                }
            });
        }
    };

    sqlx::query(
        r#"
        INSERT INTO account_progress (account_id, progress, updated_at)
        VALUES (?, 0, ?)
        ON CONFLICT (account_id) DO NOTHING
        "#,
    )
    .bind(account_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(account_id)
}
