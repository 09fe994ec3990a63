// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        level::Level,
        question::{NewQuestion, Question},
        quiz_attempt::{AnswerDetail, AttemptScore, LatestAttempt, NewAnswer, QuizAttempt},
        user::User,
    },
    store::{QuizStore, UserStore},
};

const QUESTION_COLUMNS: &str =
    "id, question_text, option_a, option_b, option_c, option_d, correct_option, level";

/// PostgreSQL-backed implementation of the store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// Raw `questions` row; `level` is checked on the way out.
#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    question_text: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_option: String,
    level: i32,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let level = Level::try_from(row.level).map_err(|e| {
            AppError::InternalServerError(format!("question {} has invalid level: {}", row.id, e))
        })?;

        Ok(Self {
            id: row.id,
            question_text: row.question_text,
            option_a: row.option_a,
            option_b: row.option_b,
            option_c: row.option_c,
            option_d: row.option_d,
            correct_option: row.correct_option,
            level,
        })
    }
}

fn into_questions(rows: Vec<QuestionRow>) -> Result<Vec<Question>, AppError> {
    rows.into_iter().map(Question::try_from).collect()
}

#[derive(FromRow)]
struct AttemptRow {
    id: i64,
    user_id: i64,
    score: i64,
    submitted_at: DateTime<Utc>,
}

impl From<AttemptRow> for QuizAttempt {
    fn from(row: AttemptRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            score: row.score,
            submitted_at: row.submitted_at,
        }
    }
}

#[derive(FromRow)]
struct LatestAttemptRow {
    attempt_id: i64,
    score: i64,
    level: i32,
}

#[derive(FromRow)]
struct AnswerDetailRow {
    answer_id: i64,
    attempt_id: i64,
    selected_option: String,
    #[sqlx(flatten)]
    question: QuestionRow,
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if unique {
                AppError::BadRequest("Already registered".to_string())
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            INSERT INTO questions
                (question_text, option_a, option_b, option_c, option_d, correct_option, level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(&question.question_text)
        .bind(&question.option_a)
        .bind(&question.option_b)
        .bind(&question.option_c)
        .bind(&question.option_d)
        .bind(question.correct_option.to_ascii_uppercase())
        .bind(question.level.as_i32())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Question::try_from).transpose()
    }

    async fn find_questions(&self, ids: &[i64]) -> Result<Vec<Question>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Dynamic IN clause
        let mut query_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM questions WHERE id IN (",
            QUESTION_COLUMNS
        ));
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        into_questions(rows)
    }

    async fn questions_by_level(&self, level: Level) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions WHERE level = $1 ORDER BY id",
            QUESTION_COLUMNS
        ))
        .bind(level.as_i32())
        .fetch_all(&self.pool)
        .await?;

        into_questions(rows)
    }

    async fn all_questions(&self) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions ORDER BY level, id",
            QUESTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_questions(rows)
    }

    async fn count_questions(&self, level: Level) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE level = $1")
            .bind(level.as_i32())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update_question_level(&self, id: i64, level: Level) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE questions SET level = $1 WHERE id = $2")
            .bind(level.as_i32())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn level_attempt_scores(
        &self,
        user_id: i64,
        level: Level,
    ) -> Result<Vec<AttemptScore>, AppError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT uq.id, uq.score
            FROM user_quizzes uq
            WHERE uq.user_id = $1
              AND EXISTS (
                  SELECT 1
                  FROM user_quiz_answers a
                  JOIN questions q ON q.id = a.question_id
                  WHERE a.user_quiz_id = uq.id AND q.level = $2
              )
            ORDER BY uq.id
            "#,
        )
        .bind(user_id)
        .bind(level.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(attempt_id, score)| AttemptScore { attempt_id, score })
            .collect())
    }

    async fn latest_attempt(&self, user_id: i64) -> Result<Option<LatestAttempt>, AppError> {
        let row = sqlx::query_as::<_, LatestAttemptRow>(
            r#"
            SELECT uq.id AS attempt_id, uq.score, q.level
            FROM user_quizzes uq
            JOIN LATERAL (
                SELECT a.question_id
                FROM user_quiz_answers a
                WHERE a.user_quiz_id = uq.id
                ORDER BY a.id
                LIMIT 1
            ) first_answer ON TRUE
            JOIN questions q ON q.id = first_answer.question_id
            WHERE uq.user_id = $1
            ORDER BY uq.submitted_at DESC, uq.id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| -> Result<LatestAttempt, AppError> {
            let level = Level::try_from(r.level).map_err(AppError::InternalServerError)?;
            Ok(LatestAttempt {
                attempt_id: r.attempt_id,
                score: r.score,
                level,
            })
        })
        .transpose()
    }

    async fn insert_attempt(
        &self,
        user_id: i64,
        score: i64,
        answers: &[NewAnswer],
    ) -> Result<QuizAttempt, AppError> {
        // Dropping the transaction without commit rolls it back,
        // so an attempt never exists without its answers.
        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, AttemptRow>(
            r#"
            INSERT INTO user_quizzes (user_id, score)
            VALUES ($1, $2)
            RETURNING id, user_id, score, submitted_at
            "#,
        )
        .bind(user_id)
        .bind(score)
        .fetch_one(&mut *tx)
        .await?;

        if !answers.is_empty() {
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO user_quiz_answers (user_quiz_id, question_id, selected_option) ",
            );
            query_builder.push_values(answers, |mut row, answer| {
                row.push_bind(attempt.id)
                    .push_bind(answer.question_id)
                    .push_bind(answer.selected_option.clone());
            });
            query_builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(attempt.into())
    }

    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, user_id, score, submitted_at
            FROM user_quizzes
            WHERE user_id = $1
            ORDER BY submitted_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuizAttempt::from).collect())
    }

    async fn answer_details_for_user(&self, user_id: i64) -> Result<Vec<AnswerDetail>, AppError> {
        let rows = sqlx::query_as::<_, AnswerDetailRow>(
            r#"
            SELECT
                a.id AS answer_id,
                a.user_quiz_id AS attempt_id,
                a.selected_option,
                q.id, q.question_text, q.option_a, q.option_b, q.option_c, q.option_d,
                q.correct_option, q.level
            FROM user_quiz_answers a
            JOIN user_quizzes uq ON uq.id = a.user_quiz_id
            JOIN questions q ON q.id = a.question_id
            WHERE uq.user_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<AnswerDetail, AppError> {
                Ok(AnswerDetail {
                    answer_id: row.answer_id,
                    attempt_id: row.attempt_id,
                    selected_option: row.selected_option,
                    question: row.question.try_into()?,
                })
            })
            .collect()
    }
}
