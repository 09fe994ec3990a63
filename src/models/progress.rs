// src/models/progress.rs

use serde::Serialize;

use crate::models::{level::Level, question::QuestionView};

/// Best-attempt statistics for one level, judged against the mastery bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub total_questions: i64,
    pub best_score: i64,
    pub attempts: i64,
    pub percentage: f64,
    pub passed: bool,
}

/// Per-level entry of the progress summary, judged against the advance bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub total_questions: i64,
    pub best_score: i64,
    pub attempts: i64,
    pub percentage: f64,
    pub unlocked: bool,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummaries {
    pub level_1: LevelSummary,
    pub level_2: LevelSummary,
    pub level_3: LevelSummary,
}

/// Response of `GET /api/user-progress`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub progress: LevelSummaries,
    pub current_level: Level,
}

/// Response of `GET /api/questions`.
#[derive(Debug, Serialize)]
pub struct LevelQuestions {
    pub questions: Vec<QuestionView>,
    pub current_level: Level,
    pub total_levels: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_info: Option<LevelProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `GET /api/all-questions`.
#[derive(Debug, Serialize)]
pub struct QuestionCatalog {
    pub questions: Vec<QuestionView>,
    pub total_questions: usize,
}
