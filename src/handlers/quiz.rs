// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::quiz_attempt::SubmitQuizRequest,
    services::{history, progression, questions, submission},
    state::SharedQuizStore,
    utils::jwt::Claims,
};

/// Serves the questions of the level the user should play next,
/// along with the user's progress on that level.
pub async fn get_questions(
    State(store): State<SharedQuizStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let served = questions::questions_for_user(store.as_ref(), user_id).await?;
    Ok(Json(served))
}

/// Grades the submitted answers and stores a new attempt.
///
/// * Keys of `answers` are question ids, values the selected option text.
/// * Unknown question ids are ignored.
pub async fn submit_quiz(
    State(store): State<SharedQuizStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let result = submission::submit_quiz(store.as_ref(), user_id, &req.answers).await?;
    Ok(Json(result))
}

/// Lists the user's attempts, most recent first.
pub async fn quiz_history(
    State(store): State<SharedQuizStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let history = history::quiz_history(store.as_ref(), user_id).await?;
    Ok(Json(history))
}

/// Per-level progress and the current level.
pub async fn user_progress(
    State(store): State<SharedQuizStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let summary = progression::user_progress(store.as_ref(), user_id).await?;
    Ok(Json(summary))
}
