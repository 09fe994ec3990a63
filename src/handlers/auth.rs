// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CredentialsRequest, TokenResponse},
    state::SharedUserStore,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created.
pub async fn register(
    State(users): State<SharedUserStore>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_missing_field() {
        return Err(AppError::BadRequest("Missing username or password".to_string()));
    }
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if users.find_by_username(&payload.username).await?.is_some() {
        return Err(AppError::BadRequest("Already registered".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;
    let user = users.create_user(&payload.username, &hashed_password).await?;
    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(json!({ "message": "Registered" }))))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the username and password against the store.
/// If valid, signs a JWT token with the user's ID.
pub async fn login(
    State(users): State<SharedUserStore>,
    State(config): State<Config>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = users
        .find_by_username(&payload.username)
        .await
        .inspect_err(|e| tracing::error!("Login store error: {:?}", e))?
        .ok_or(AppError::AuthError("Username is incorrect".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::AuthError("Password is incorrect".to_string()));
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(TokenResponse {
        access_token: token,
        user_id: Some(user.id),
        expires_in: config.jwt_expiration,
    }))
}

/// Issues a fresh token for an already authenticated user.
pub async fn refresh_token(
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let token = sign_jwt(user_id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(TokenResponse {
        access_token: token,
        user_id: None,
        expires_in: config.jwt_expiration,
    }))
}
