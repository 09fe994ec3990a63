// src/services/progression.rs

//! Level progression.
//!
//! The level a user plays is never stored. It is re-derived from the attempt
//! history on every request, so it can always be recomputed and never drifts.
//!
//! Two bars are involved and they are deliberately kept apart:
//! * mastery ([`MASTERY_PERCENTAGE`]): best attempt at a level, against the
//!   level's question count. Gates the ascending scan and `level_progress`.
//! * advance ([`ADVANCE_PERCENTAGE`]): used for the latest attempt once every
//!   level is mastered, and for the per-level flags of the progress summary.

use crate::{
    config::{ADVANCE_PERCENTAGE, MASTERY_PERCENTAGE},
    error::AppError,
    models::{
        level::Level,
        progress::{LevelProgress, LevelSummaries, LevelSummary, ProgressSummary},
        quiz_attempt::LatestAttempt,
    },
    store::QuizStore,
};

/// Question count of a level plus the raw scores of every attempt that touched it.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelHistory {
    pub level: Level,
    pub total_questions: i64,
    pub attempt_scores: Vec<i64>,
}

impl LevelHistory {
    pub fn attempts(&self) -> i64 {
        self.attempt_scores.len() as i64
    }

    pub fn best_score(&self) -> i64 {
        self.attempt_scores.iter().copied().max().unwrap_or(0)
    }

    pub fn best_percentage(&self) -> f64 {
        percentage(self.best_score(), self.total_questions)
    }

    /// At least one attempt and a best attempt at or above the mastery bar.
    pub fn is_mastered(&self) -> bool {
        !self.attempt_scores.is_empty() && self.best_percentage() >= MASTERY_PERCENTAGE
    }
}

/// `100 * score / total`, or 0 when there is nothing to divide by.
pub fn percentage(score: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    score as f64 / total as f64 * 100.0
}

/// Rounds to one decimal place for display. Exact halves go to the even digit,
/// so 6.25 shows as 6.2 and 18.75 as 18.8.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Decides which level the user should play next.
///
/// Levels without questions are skipped. If some level is not mastered, the
/// lowest such level is returned. Otherwise the latest attempt decides: at or
/// above the advance bar moves on (wrapping to 1 after level 3), below it stays.
///
/// `latest` is only consulted when every level is mastered; its percentage is
/// taken against the question count of its own level.
pub fn current_level(histories: &[LevelHistory], latest: Option<&LatestAttempt>) -> Level {
    let unfinished = histories
        .iter()
        .filter(|h| h.total_questions > 0)
        .find(|h| !h.is_mastered());

    if let Some(history) = unfinished {
        return history.level;
    }

    let Some(latest) = latest else {
        return Level::One;
    };

    let total = histories
        .iter()
        .find(|h| h.level == latest.level)
        .map(|h| h.total_questions)
        .unwrap_or(0);

    if percentage(latest.score, total) >= ADVANCE_PERCENTAGE {
        latest.level.next_wrapping()
    } else {
        latest.level
    }
}

/// Whether [`current_level`] needs the latest attempt at all.
pub fn needs_latest_attempt(histories: &[LevelHistory]) -> bool {
    histories
        .iter()
        .filter(|h| h.total_questions > 0)
        .all(LevelHistory::is_mastered)
}

pub fn level_progress(history: &LevelHistory) -> LevelProgress {
    let pct = history.best_percentage();
    LevelProgress {
        total_questions: history.total_questions,
        best_score: history.best_score(),
        attempts: history.attempts(),
        percentage: round1(pct),
        passed: pct >= MASTERY_PERCENTAGE,
    }
}

fn level_summary(history: &LevelHistory, passed_below: bool) -> LevelSummary {
    let first = history.level.previous().is_none();
    if history.total_questions == 0 {
        return LevelSummary {
            total_questions: 0,
            best_score: 0,
            attempts: 0,
            percentage: 0.0,
            unlocked: first,
            passed: false,
        };
    }

    let pct = history.best_percentage();
    LevelSummary {
        total_questions: history.total_questions,
        best_score: history.best_score(),
        attempts: history.attempts(),
        percentage: round1(pct),
        unlocked: first || passed_below,
        passed: pct >= ADVANCE_PERCENTAGE,
    }
}

/// Per-level summary with the unlock chain: level 1 is always unlocked,
/// every other level only when the one below it passed.
pub fn progress_summary(histories: &[LevelHistory; 3]) -> LevelSummaries {
    let mut passed_below = false;
    let [level_1, level_2, level_3] = histories.each_ref().map(|history| {
        let summary = level_summary(history, passed_below);
        passed_below = summary.passed;
        summary
    });

    LevelSummaries {
        level_1,
        level_2,
        level_3,
    }
}

pub(crate) fn log_store_failure(operation: &str, user_id: i64, err: &AppError) {
    tracing::error!(operation, user_id, "Store failure: {}", err);
}

/// Loads question count and attempt scores for one level.
pub async fn load_level_history(
    store: &dyn QuizStore,
    user_id: i64,
    level: Level,
) -> Result<LevelHistory, AppError> {
    let total_questions = store.count_questions(level).await?;
    let attempt_scores = store
        .level_attempt_scores(user_id, level)
        .await?
        .into_iter()
        .map(|a| a.score)
        .collect();

    Ok(LevelHistory {
        level,
        total_questions,
        attempt_scores,
    })
}

/// Loads the history of all three levels, in ascending order.
pub async fn load_history(
    store: &dyn QuizStore,
    user_id: i64,
) -> Result<[LevelHistory; 3], AppError> {
    Ok([
        load_level_history(store, user_id, Level::One).await?,
        load_level_history(store, user_id, Level::Two).await?,
        load_level_history(store, user_id, Level::Three).await?,
    ])
}

async fn resolve_current_level(
    store: &dyn QuizStore,
    user_id: i64,
    histories: &[LevelHistory],
) -> Result<Level, AppError> {
    let latest = if needs_latest_attempt(histories) {
        store.latest_attempt(user_id).await?
    } else {
        None
    };
    Ok(current_level(histories, latest.as_ref()))
}

async fn compute_current_level(store: &dyn QuizStore, user_id: i64) -> Result<Level, AppError> {
    let histories = load_history(store, user_id).await?;
    resolve_current_level(store, user_id, &histories).await
}

/// The level the user should currently play.
pub async fn current_level_for(store: &dyn QuizStore, user_id: i64) -> Result<Level, AppError> {
    compute_current_level(store, user_id)
        .await
        .inspect_err(|e| log_store_failure("current_level", user_id, e))
}

/// Best-attempt statistics for one level.
pub async fn level_progress_for(
    store: &dyn QuizStore,
    user_id: i64,
    level: Level,
) -> Result<LevelProgress, AppError> {
    let history = load_level_history(store, user_id, level)
        .await
        .inspect_err(|e| log_store_failure("level_progress", user_id, e))?;
    Ok(level_progress(&history))
}

async fn compute_user_progress(
    store: &dyn QuizStore,
    user_id: i64,
) -> Result<ProgressSummary, AppError> {
    let histories = load_history(store, user_id).await?;
    let current_level = resolve_current_level(store, user_id, &histories).await?;
    Ok(ProgressSummary {
        progress: progress_summary(&histories),
        current_level,
    })
}

/// Per-level summary plus the current level.
pub async fn user_progress(
    store: &dyn QuizStore,
    user_id: i64,
) -> Result<ProgressSummary, AppError> {
    compute_user_progress(store, user_id)
        .await
        .inspect_err(|e| log_store_failure("user_progress", user_id, e))
}
