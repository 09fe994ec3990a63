// src/store/mod.rs

//! Data-access capabilities used by the services.
//!
//! Handlers and services never touch a pool directly; they go through these
//! traits so the same logic runs against PostgreSQL or the in-memory store.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        level::Level,
        question::{NewQuestion, Question},
        quiz_attempt::{AnswerDetail, AttemptScore, LatestAttempt, NewAnswer, QuizAttempt},
        user::User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Fails with `BadRequest("Already registered")` when the name is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, AppError>;

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError>;

    /// Questions among `ids` that exist, in no particular order.
    async fn find_questions(&self, ids: &[i64]) -> Result<Vec<Question>, AppError>;

    /// Ordered by id.
    async fn questions_by_level(&self, level: Level) -> Result<Vec<Question>, AppError>;

    /// Ordered by level, then id.
    async fn all_questions(&self) -> Result<Vec<Question>, AppError>;

    async fn count_questions(&self, level: Level) -> Result<i64, AppError>;

    /// Returns `false` when no question has this id.
    async fn update_question_level(&self, id: i64, level: Level) -> Result<bool, AppError>;

    /// One entry per attempt of `user_id` with at least one answer to a
    /// question currently at `level`.
    async fn level_attempt_scores(
        &self,
        user_id: i64,
        level: Level,
    ) -> Result<Vec<AttemptScore>, AppError>;

    /// Most recent attempt (by `submitted_at`, then id) having at least one answer.
    async fn latest_attempt(&self, user_id: i64) -> Result<Option<LatestAttempt>, AppError>;

    /// Stores the attempt and all its answers as one unit: on error neither is visible.
    async fn insert_attempt(
        &self,
        user_id: i64,
        score: i64,
        answers: &[NewAnswer],
    ) -> Result<QuizAttempt, AppError>;

    /// Most recent first.
    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError>;

    /// Every stored answer of the user joined with its question, ordered by answer id.
    async fn answer_details_for_user(&self, user_id: i64) -> Result<Vec<AnswerDetail>, AppError>;
}
