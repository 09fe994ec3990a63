// src/handlers/admin.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::question::UpdateQuestionLevelRequest,
    services::questions,
    state::SharedQuizStore,
};

/// Lists every question with its correct answer, for the settings screen.
pub async fn list_questions(
    State(store): State<SharedQuizStore>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = questions::all_questions(store.as_ref()).await?;
    Ok(Json(catalog))
}

/// Moves a question to another level.
pub async fn update_question_level(
    State(store): State<SharedQuizStore>,
    Json(payload): Json<UpdateQuestionLevelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (question_id, level) = questions::update_question_level(store.as_ref(), &payload).await?;

    Ok(Json(json!({
        "message": "Question level updated successfully",
        "question_id": question_id,
        "new_level": level,
    })))
}
