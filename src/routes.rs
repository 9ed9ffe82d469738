// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, check, course, progress},
    state::AppState,
    utils::session::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (checks, course, auth, progress).
/// * Guards `/api/auth/me` and `/api/progress/*` with the session middleware.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_session = middleware::from_fn_with_state(state.clone(), auth_middleware);

    // Stateless answer checks
    let check_routes = Router::new()
        .route("/api/check-quiz", post(check::check_quiz))
        .route("/api/check-dnd", post(check::check_drag_and_drop))
        .route("/api/check-writing", post(check::check_writing));

    let course_routes = Router::new()
        .route("/layout", get(course::get_layout))
        .route("/unlocks", get(course::preview_unlocks));

    let auth_routes = Router::new()
        .route("/captcha-challenge", get(auth::captcha_challenge))
        .route("/register", post(auth::register))
        .route("/register-verify", post(auth::register_verify))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // Protected auth routes
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(require_session.clone()),
        );

    let progress_routes = Router::new()
        .route("/", get(progress::get_progress).post(progress::set_progress))
        .route("/unlocks", get(progress::my_unlocks))
        .route_layer(require_session);

    Router::new()
        .merge(check_routes)
        .nest("/api/course", course_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/progress", progress_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
