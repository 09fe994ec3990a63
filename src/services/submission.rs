// src/services/submission.rs

use std::collections::{BTreeMap, HashMap};

use crate::{
    config::MASTERY_PERCENTAGE,
    error::AppError,
    models::{
        level::Level,
        question::Question,
        quiz_attempt::{AnswerSheet, NewAnswer, SubmissionResult},
    },
    services::progression::{log_store_failure, percentage, round1},
    store::QuizStore,
};

/// Result of grading an answer sheet, before anything is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedSheet {
    pub score: i64,
    /// Answers to existing questions, in sheet order.
    pub answers: Vec<NewAnswer>,
    pub correct_answers: BTreeMap<String, String>,
    /// Level of the last graded question.
    pub last_level: Option<Level>,
}

impl GradedSheet {
    pub fn total(&self) -> i64 {
        self.answers.len() as i64
    }
}

/// Grades answers in sheet order against the known questions.
///
/// Unknown question ids are skipped: they neither count towards the total
/// nor raise an error. Selections are compared to the correct option text
/// exactly (no trimming, case-sensitive).
pub fn grade_answers(sheet: &AnswerSheet, questions: &HashMap<i64, Question>) -> GradedSheet {
    let mut graded = GradedSheet {
        score: 0,
        answers: Vec::with_capacity(sheet.0.len()),
        correct_answers: BTreeMap::new(),
        last_level: None,
    };

    for (question_id, selected) in &sheet.0 {
        let Some(question) = questions.get(question_id) else {
            continue;
        };

        if question.is_correct(selected) {
            graded.score += 1;
        }
        graded.answers.push(NewAnswer {
            question_id: *question_id,
            selected_option: selected.clone(),
        });
        graded
            .correct_answers
            .insert(question_id.to_string(), question.correct_answer().to_string());
        graded.last_level = Some(question.level);
    }

    graded
}

/// Derives the response fields from a graded sheet.
pub fn submission_result(graded: GradedSheet) -> SubmissionResult {
    let total = graded.total();
    let pct = percentage(graded.score, total);
    let level_passed = pct >= MASTERY_PERCENTAGE;
    let next_level_unlocked = level_passed && graded.last_level.is_some_and(|l| !l.is_last());

    SubmissionResult {
        score: graded.score,
        total_questions: total,
        correct_answers: graded.correct_answers,
        percentage: round1(pct),
        level_passed,
        current_level: graded.last_level,
        next_level_unlocked,
        is_perfect: graded.score == total,
    }
}

/// Grades a submission and stores it as a new attempt.
///
/// Every call creates a new attempt, even for an identical sheet.
pub async fn submit_quiz(
    store: &dyn QuizStore,
    user_id: i64,
    sheet: &AnswerSheet,
) -> Result<SubmissionResult, AppError> {
    let questions: HashMap<i64, Question> = store
        .find_questions(&sheet.question_ids())
        .await
        .inspect_err(|e| log_store_failure("submit_quiz", user_id, e))?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let graded = grade_answers(sheet, &questions);

    let attempt = store
        .insert_attempt(user_id, graded.score, &graded.answers)
        .await
        .inspect_err(|e| log_store_failure("submit_quiz", user_id, e))?;

    tracing::info!(
        user_id,
        attempt_id = attempt.id,
        score = graded.score,
        total = graded.total(),
        "Quiz submitted"
    );

    Ok(submission_result(graded))
}
