// src/utils/session.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{error::AppError, utils::hash::sha256_hex};

/// The account behind a valid bearer token.
/// Injected into request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub id: i64,
    pub email: String,
}

/// A freshly issued session. The raw token is only ever returned here.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionRow {
    account_id: i64,
    email: String,
    expires_at: DateTime<Utc>,
}

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Stores the hash of a new token with an absolute expiry.
pub async fn create_session(
    pool: &SqlitePool,
    account_id: i64,
    lifetime_days: i64,
) -> Result<IssuedSession, AppError> {
    let token = generate_token();
    let now = Utc::now();
    let expires_at = now + Duration::days(lifetime_days);

    sqlx::query(
        "INSERT INTO sessions (token_hash, account_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(sha256_hex(&token))
    .bind(account_id)
    .bind(expires_at)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(IssuedSession { token, expires_at })
}

/// Looks a token up. Expired sessions are deleted on sight and treated as absent.
pub async fn resolve_session(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<CurrentAccount>, AppError> {
    let token_hash = sha256_hex(token);

    let row = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT s.account_id, a.email, s.expires_at
        FROM sessions s
        JOIN accounts a ON a.id = s.account_id
        WHERE s.token_hash = ?
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if row.expires_at <= Utc::now() {
        tracing::debug!("Session for account {} expired", row.account_id);
        delete_session(pool, &token_hash).await?;
        return Ok(None);
    }

    Ok(Some(CurrentAccount {
        id: row.account_id,
        email: row.email,
    }))
}

pub async fn delete_session(pool: &SqlitePool, token_hash: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header
/// against the sessions table.
/// If valid, injects `CurrentAccount` into the request extensions for handlers to use.
/// If invalid or expired, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(pool): State<SqlitePool>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(AppError::unauthorized)?;

    let account = resolve_session(&pool, &token)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn session_resolves_to_its_account_until_deleted() {
        let pool = test_pool().await;
        let account_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO accounts (email, password_hash, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind("learner@example.com")
        .bind("$argon2id$placeholder")
        .bind(Utc::now())
        .fetch_one(&pool)
        .await
        .unwrap();

        let issued = create_session(&pool, account_id, 30).await.unwrap();
        assert!(issued.expires_at > Utc::now() + Duration::days(29));

        let account = resolve_session(&pool, &issued.token).await.unwrap().unwrap();
        assert_eq!(account.id, account_id);
        assert_eq!(account.email, "learner@example.com");

        delete_session(&pool, &sha256_hex(&issued.token)).await.unwrap();
        assert!(resolve_session(&pool, &issued.token).await.unwrap().is_none());
    }

    #[test]
    fn tokens_are_long_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn parses_bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123 "));
        assert_eq!(bearer_token(&headers), Some("abc123".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
