// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, health, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

fn cors_layer(origin: &str) -> CorsLayer {
    let origin = HeaderValue::from_str(origin).unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid CORS_ORIGIN '{}', falling back to {}",
            origin,
            DEFAULT_CORS_ORIGIN
        );
        HeaderValue::from_static(DEFAULT_CORS_ORIGIN)
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Public routes: health, register, login.
/// * Everything under `/api` plus `/refresh-token` requires a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let token_routes = Router::new()
        .route("/refresh-token", post(auth::refresh_token))
        .layer(require_auth.clone());

    let quiz_routes = Router::new()
        .route("/questions", get(quiz::get_questions))
        .route("/submit", post(quiz::submit_quiz))
        .route("/quiz-history", get(quiz::quiz_history))
        .route("/user-progress", get(quiz::user_progress))
        .route("/all-questions", get(admin::list_questions))
        .route("/update-question-level", put(admin::update_question_level))
        .layer(require_auth);

    Router::new()
        .merge(public_routes)
        .merge(token_routes)
        .nest("/api", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
