// src/services/questions.rs

use serde_json::Value;

use crate::{
    config::TOTAL_LEVELS,
    error::AppError,
    models::{
        level::Level,
        progress::{LevelQuestions, QuestionCatalog},
        question::{NewQuestion, QuestionView, UpdateQuestionLevelRequest},
    },
    services::progression::{self, log_store_failure},
    store::QuizStore,
};

/// Questions of the level the user should currently play.
pub async fn questions_for_user(
    store: &dyn QuizStore,
    user_id: i64,
) -> Result<LevelQuestions, AppError> {
    let current_level = progression::current_level_for(store, user_id).await?;

    let questions = store
        .questions_by_level(current_level)
        .await
        .inspect_err(|e| log_store_failure("questions_for_user", user_id, e))?;

    if questions.is_empty() {
        return Ok(LevelQuestions {
            questions: Vec::new(),
            current_level,
            total_levels: TOTAL_LEVELS,
            level_info: None,
            message: Some(format!("No questions available for level {}", current_level)),
        });
    }

    let level_info = progression::level_progress_for(store, user_id, current_level).await?;

    Ok(LevelQuestions {
        questions: questions.iter().map(QuestionView::from).collect(),
        current_level,
        total_levels: TOTAL_LEVELS,
        level_info: Some(level_info),
        message: None,
    })
}

/// Every question, ordered by level then id.
pub async fn all_questions(store: &dyn QuizStore) -> Result<QuestionCatalog, AppError> {
    let questions: Vec<QuestionView> = store
        .all_questions()
        .await
        .inspect_err(|e| tracing::error!(operation = "all_questions", "Store failure: {}", e))?
        .iter()
        .map(QuestionView::from)
        .collect();

    Ok(QuestionCatalog {
        total_questions: questions.len(),
        questions,
    })
}

/// JSON values that count as "not provided": null, false, zero and empty containers.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Checks a level reassignment request; returns the question id and new level.
///
/// `level` must be the number 1, 2 or 3 (`2.0` is accepted, `"2"` is not).
pub fn validate_level_update(req: &UpdateQuestionLevelRequest) -> Result<(i64, Level), AppError> {
    let (question_id, level) = match (req.question_id, req.level.as_ref()) {
        (Some(id), Some(level)) if id != 0 && !is_blank(level) => (id, level),
        _ => {
            return Err(AppError::BadRequest(
                "Question ID and level are required".to_string(),
            ));
        }
    };

    let level = level
        .as_f64()
        .filter(|v| v.fract() == 0.0)
        .and_then(|v| Level::try_from(v as i64).ok())
        .ok_or_else(|| AppError::BadRequest("Level must be 1, 2, or 3".to_string()))?;

    Ok((question_id, level))
}

/// Moves a question to another level.
pub async fn update_question_level(
    store: &dyn QuizStore,
    req: &UpdateQuestionLevelRequest,
) -> Result<(i64, Level), AppError> {
    let (question_id, level) = validate_level_update(req)?;

    let log_failure = |e: &AppError| {
        tracing::error!(operation = "update_question_level", question_id, "Store failure: {}", e)
    };

    let question = store
        .find_question(question_id)
        .await
        .inspect_err(log_failure)?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.level != level {
        let updated = store
            .update_question_level(question_id, level)
            .await
            .inspect_err(log_failure)?;
        if !updated {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
    }

    tracing::info!(question_id, level = level.as_i32(), "Question level updated");
    Ok((question_id, level))
}

/// Parses a JSON array of questions.
pub fn parse_seed(json: &str) -> Result<Vec<NewQuestion>, AppError> {
    let questions: Vec<NewQuestion> = serde_json::from_str(json)?;
    for (index, question) in questions.iter().enumerate() {
        validator::Validate::validate(question).map_err(|e| {
            AppError::BadRequest(format!("seed question #{}: {}", index + 1, e))
        })?;
    }
    Ok(questions)
}

/// Loads seed questions when the question table is empty.
/// Returns the number of inserted questions.
pub async fn seed_questions(store: &dyn QuizStore, json: &str) -> Result<usize, AppError> {
    let mut existing = 0;
    for level in Level::ALL {
        existing += store.count_questions(level).await?;
    }
    if existing > 0 {
        tracing::info!("Question table already populated ({} questions), skipping seed", existing);
        return Ok(0);
    }

    let questions = parse_seed(json)?;
    let count = questions.len();
    for question in questions {
        store.insert_question(question).await?;
    }
    tracing::info!("Seeded {} questions", count);
    Ok(count)
}
