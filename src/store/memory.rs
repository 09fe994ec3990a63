// src/store/memory.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

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

#[derive(Debug, Clone)]
struct StoredAnswer {
    id: i64,
    attempt_id: i64,
    question_id: i64,
    selected_option: String,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    questions: Vec<Question>,
    attempts: Vec<QuizAttempt>,
    answers: Vec<StoredAnswer>,
    next_user_id: i64,
    next_question_id: i64,
    next_attempt_id: i64,
    next_answer_id: i64,
}

impl Tables {
    fn question(&self, id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Attempts of a user, most recent first. Ties on the timestamp fall back to insertion order.
    fn attempts_desc(&self, user_id: i64) -> Vec<&QuizAttempt> {
        let mut attempts: Vec<&QuizAttempt> = self
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .collect();
        attempts.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        attempts
    }

    fn first_answer(&self, attempt_id: i64) -> Option<&StoredAnswer> {
        self.answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .min_by_key(|a| a.id)
    }
}

/// In-process store with the same ordering semantics as [`PgStore`](super::PgStore).
///
/// Used by the test suite and when `DATABASE_URL=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::BadRequest("Already registered".to_string()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Some(Utc::now()),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, AppError> {
        let mut tables = self.tables.write().await;
        tables.next_question_id += 1;
        let stored = Question {
            id: tables.next_question_id,
            question_text: question.question_text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
            correct_option: question.correct_option.to_ascii_uppercase(),
            level: question.level,
        };
        tables.questions.push(stored.clone());
        Ok(stored)
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.question(id).cloned())
    }

    async fn find_questions(&self, ids: &[i64]) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        Ok(tables
            .questions
            .iter()
            .filter(|q| wanted.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn questions_by_level(&self, level: Level) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        let mut questions: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| q.level == level)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn all_questions(&self) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        let mut questions = tables.questions.clone();
        questions.sort_by_key(|q| (q.level, q.id));
        Ok(questions)
    }

    async fn count_questions(&self, level: Level) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().filter(|q| q.level == level).count() as i64)
    }

    async fn update_question_level(&self, id: i64, level: Level) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.questions.iter_mut().find(|q| q.id == id) {
            Some(question) => {
                question.level = level;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn level_attempt_scores(
        &self,
        user_id: i64,
        level: Level,
    ) -> Result<Vec<AttemptScore>, AppError> {
        let tables = self.tables.read().await;
        let touched: HashSet<i64> = tables
            .answers
            .iter()
            .filter(|a| tables.question(a.question_id).is_some_and(|q| q.level == level))
            .map(|a| a.attempt_id)
            .collect();

        let mut scores: Vec<AttemptScore> = tables
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && touched.contains(&a.id))
            .map(|a| AttemptScore {
                attempt_id: a.id,
                score: a.score,
            })
            .collect();
        scores.sort_by_key(|s| s.attempt_id);
        Ok(scores)
    }

    async fn latest_attempt(&self, user_id: i64) -> Result<Option<LatestAttempt>, AppError> {
        let tables = self.tables.read().await;
        let latest = tables.attempts_desc(user_id).into_iter().find_map(|attempt| {
            let answer = tables.first_answer(attempt.id)?;
            let question = tables.question(answer.question_id)?;
            Some(LatestAttempt {
                attempt_id: attempt.id,
                score: attempt.score,
                level: question.level,
            })
        });
        Ok(latest)
    }

    async fn insert_attempt(
        &self,
        user_id: i64,
        score: i64,
        answers: &[NewAnswer],
    ) -> Result<QuizAttempt, AppError> {
        // Single write guard: the attempt and its answers become visible together.
        let mut tables = self.tables.write().await;

        tables.next_attempt_id += 1;
        let attempt = QuizAttempt {
            id: tables.next_attempt_id,
            user_id,
            score,
            submitted_at: Utc::now(),
        };

        let mut stored = Vec::with_capacity(answers.len());
        for answer in answers {
            tables.next_answer_id += 1;
            stored.push(StoredAnswer {
                id: tables.next_answer_id,
                attempt_id: attempt.id,
                question_id: answer.question_id,
                selected_option: answer.selected_option.clone(),
            });
        }

        tables.attempts.push(attempt.clone());
        tables.answers.extend(stored);
        Ok(attempt)
    }

    async fn attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.attempts_desc(user_id).into_iter().cloned().collect())
    }

    async fn answer_details_for_user(&self, user_id: i64) -> Result<Vec<AnswerDetail>, AppError> {
        let tables = self.tables.read().await;
        let owned: HashMap<i64, i64> = tables
            .attempts
            .iter()
            .map(|a| (a.id, a.user_id))
            .collect();

        let mut details: Vec<AnswerDetail> = tables
            .answers
            .iter()
            .filter(|a| owned.get(&a.attempt_id) == Some(&user_id))
            .filter_map(|a| {
                let question = tables.question(a.question_id)?;
                Some(AnswerDetail {
                    answer_id: a.id,
                    attempt_id: a.attempt_id,
                    selected_option: a.selected_option.clone(),
                    question: question.clone(),
                })
            })
            .collect();
        details.sort_by_key(|d| d.answer_id);
        Ok(details)
    }
}
