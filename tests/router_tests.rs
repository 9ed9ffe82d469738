// tests/router_tests.rs

//! Router-level tests that drive the service directly, without a socket.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use course_backend::{
    config::Config,
    course::{CourseLayout, Gate, ModuleSpec, ProgressModel},
    routes,
    state::AppState,
    utils::{captcha::CaptchaStore, mail::LogMailer},
};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

fn app_with_layout(layout: CourseLayout) -> Router {
    // Nothing here touches the database, so the pool is never opened
    let pool = SqlitePoolOptions::new()
        .connect_lazy("sqlite::memory:")
        .expect("Failed to create lazy pool");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        session_days: 30,
        mail_from: "no-reply@test.local".to_string(),
        course_layout_path: None,
        allowed_origins: vec!["http://localhost:8000".to_string()],
    };

    routes::create_router(AppState {
        pool,
        config,
        progress: Arc::new(ProgressModel::new(layout).unwrap()),
        captcha: CaptchaStore::new(),
        mailer: Arc::new(LogMailer::new("no-reply@test.local")),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn even_layout_unlock_preview() {
    let mut modules: Vec<ModuleSpec> = (1..=5)
        .map(|id| ModuleSpec::new(id, format!("Module {}", id), 20, Gate::Start))
        .collect();
    modules.push(ModuleSpec::new(6, "Appendix", 2, Gate::Appendix));
    let app = app_with_layout(CourseLayout { modules });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/course/unlocks?progress=40")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["modules"][2]["unlocked"], true);
    assert_eq!(body["modules"][3]["unlocked"], false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/course/unlocks?progress=39")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["modules"][2]["unlocked"], false);
    assert_eq!(body["modules"][5]["unlocked"], false);
}

#[tokio::test]
async fn quiz_check_is_key_sensitive_not_order_sensitive() {
    let app = app_with_layout(CourseLayout::default_course());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/check-quiz",
            json!({ "quizId": "module1_reading", "answers": { "r3": "a", "r2": "a", "r1": "b" } }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["allCorrect"], true);

    let response = app
        .oneshot(post_json(
            "/api/check-quiz",
            json!({ "quizId": "module1_reading", "answers": { "R1": "b", "r2": "a", "r3": "a" } }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["wrongCount"], 1);
}

#[tokio::test]
async fn quiz_answers_must_be_an_object() {
    let app = app_with_layout(CourseLayout::default_course());

    let response = app
        .oneshot(post_json(
            "/api/check-quiz",
            json!({ "quizId": "module1_reading", "answers": ["b", "a", "a"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn unknown_writing_task_is_not_found() {
    let app = app_with_layout(CourseLayout::default_course());

    let response = app
        .oneshot(post_json(
            "/api/check-writing",
            json!({ "taskId": "module7_essay", "text": "Hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let app = app_with_layout(CourseLayout::default_course());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Unauthorized");
}
