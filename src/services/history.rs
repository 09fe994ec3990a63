// src/services/history.rs

use std::collections::HashMap;

use crate::{
    config::ADVANCE_PERCENTAGE,
    error::AppError,
    models::{
        level::Level,
        quiz_attempt::{AnswerBreakdown, AnswerDetail, AttemptSummary, QuizAttempt},
    },
    services::progression::{log_store_failure, percentage, round1},
    store::QuizStore,
};

const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Builds the history entry of one attempt.
///
/// The percentage here is taken against the number of answers in the
/// attempt, not against the question count of the level.
pub fn summarize_attempt(attempt: &QuizAttempt, answers: &[AnswerDetail]) -> AttemptSummary {
    let breakdown: Vec<AnswerBreakdown> = answers
        .iter()
        .map(|a| AnswerBreakdown {
            question_id: a.question.id,
            question_text: a.question.question_text.clone(),
            selected_option: a.selected_option.clone(),
            correct_answer: a.question.correct_answer().to_string(),
            is_correct: a.question.is_correct(&a.selected_option),
            level: a.question.level,
        })
        .collect();

    let level = breakdown.first().map(|a| a.level).unwrap_or(Level::One);
    let total_questions = breakdown.len() as i64;
    let pct = percentage(attempt.score, total_questions);

    AttemptSummary {
        quiz_id: attempt.id,
        score: attempt.score,
        total_questions,
        percentage: round1(pct),
        level,
        level_passed: pct >= ADVANCE_PERCENTAGE,
        submitted_at: attempt.submitted_at.format(SUBMITTED_AT_FORMAT).to_string(),
        answers: breakdown,
    }
}

/// Past attempts of a user, most recent first, with an answer-by-answer breakdown.
pub async fn quiz_history(
    store: &dyn QuizStore,
    user_id: i64,
) -> Result<Vec<AttemptSummary>, AppError> {
    let attempts = store
        .attempts_for_user(user_id)
        .await
        .inspect_err(|e| log_store_failure("quiz_history", user_id, e))?;

    let details = store
        .answer_details_for_user(user_id)
        .await
        .inspect_err(|e| log_store_failure("quiz_history", user_id, e))?;

    let mut by_attempt: HashMap<i64, Vec<AnswerDetail>> = HashMap::new();
    for detail in details {
        by_attempt.entry(detail.attempt_id).or_default().push(detail);
    }

    Ok(attempts
        .iter()
        .map(|attempt| {
            let answers = by_attempt.get(&attempt.id).map(Vec::as_slice).unwrap_or(&[]);
            summarize_attempt(attempt, answers)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::question::Question;

    fn question(id: i64, level: Level) -> Question {
        Question {
            id,
            question_text: format!("Question {}", id),
            option_a: "red".into(),
            option_b: "green".into(),
            option_c: "blue".into(),
            option_d: "black".into(),
            correct_option: "C".into(),
            level,
        }
    }

    fn detail(answer_id: i64, question: Question, selected: &str) -> AnswerDetail {
        AnswerDetail {
            answer_id,
            attempt_id: 1,
            selected_option: selected.into(),
            question,
        }
    }

    fn attempt(score: i64) -> QuizAttempt {
        QuizAttempt {
            id: 1,
            user_id: 5,
            score,
            submitted_at: Utc.with_ymd_and_hms(2025, 7, 16, 9, 5, 42).unwrap(),
        }
    }

    #[test]
    fn percentage_uses_answer_count() {
        let answers = vec![
            detail(1, question(1, Level::Two), "blue"),
            detail(2, question(2, Level::Two), "blue"),
            detail(3, question(3, Level::Two), "red"),
        ];
        let summary = summarize_attempt(&attempt(2), &answers);

        assert_eq!(summary.total_questions, 3);
        assert_eq!(summary.percentage, 66.7);
        assert!(!summary.level_passed);
        assert_eq!(summary.level, Level::Two);
        assert_eq!(summary.submitted_at, "2025-07-16 09:05");
    }

    #[test]
    fn breakdown_recomputes_correctness() {
        let answers = vec![
            detail(1, question(1, Level::One), "blue"),
            detail(2, question(2, Level::One), "Blue"),
        ];
        let summary = summarize_attempt(&attempt(1), &answers);

        assert!(summary.answers[0].is_correct);
        assert!(!summary.answers[1].is_correct);
        assert_eq!(summary.answers[1].correct_answer, "blue");
        // 1 of 2 = 50%, below the 70% history bar
        assert!(!summary.level_passed);
    }

    #[test]
    fn level_comes_from_first_answer() {
        let answers = vec![
            detail(1, question(1, Level::Three), "blue"),
            detail(2, question(2, Level::One), "blue"),
        ];
        assert_eq!(summarize_attempt(&attempt(2), &answers).level, Level::Three);
    }

    #[test]
    fn attempt_without_answers_defaults_to_level_one() {
        let summary = summarize_attempt(&attempt(0), &[]);
        assert_eq!(summary.level, Level::One);
        assert_eq!(summary.percentage, 0.0);
        assert!(!summary.level_passed);
        assert!(summary.answers.is_empty());
    }
}
