// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::level::Level;

/// A multiple-choice question with four options and one correct option letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// Letter of the correct option (`A` to `D`).
    pub correct_option: String,

    pub level: Level,
}

impl Question {
    /// Resolves an option letter to its text.
    /// Letters are case-insensitive; anything outside `A..D` resolves to `""`.
    pub fn option_text(&self, letter: &str) -> &str {
        match letter.to_ascii_uppercase().as_str() {
            "A" => &self.option_a,
            "B" => &self.option_b,
            "C" => &self.option_c,
            "D" => &self.option_d,
            _ => "",
        }
    }

    /// Text of the correct option. Submissions are graded against this, not the letter.
    pub fn correct_answer(&self) -> &str {
        self.option_text(&self.correct_option)
    }

    /// Exact, case-sensitive comparison against the correct option text.
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.correct_answer()
    }

    pub fn options(&self) -> Vec<String> {
        vec![
            self.option_a.clone(),
            self.option_b.clone(),
            self.option_c.clone(),
            self.option_d.clone(),
        ]
    }
}

/// DTO for sending a question to the client.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    /// Correct option text; the client reveals it after submission.
    pub answer: String,
    pub level: Level,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.question_text.clone(),
            options: q.options(),
            answer: q.correct_answer().to_string(),
            level: q.level,
        }
    }
}

/// DTO for creating a question (seed files).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[validate(length(max = 500))]
    pub option_a: String,
    #[validate(length(max = 500))]
    pub option_b: String,
    #[validate(length(max = 500))]
    pub option_c: String,
    #[validate(length(max = 500))]
    pub option_d: String,
    #[validate(custom(function = validate_option_letter))]
    pub correct_option: String,
    #[serde(default = "default_level")]
    pub level: Level,
}

fn default_level() -> Level {
    Level::One
}

fn validate_option_letter(letter: &str) -> Result<(), validator::ValidationError> {
    match letter.to_ascii_uppercase().as_str() {
        "A" | "B" | "C" | "D" => Ok(()),
        _ => Err(validator::ValidationError::new("correct_option_must_be_a_to_d")),
    }
}

/// DTO for the administrative level reassignment.
/// Both fields are optional and `level` is left untyped, so that missing or
/// malformed values surface as a 400 with a message instead of a 422.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionLevelRequest {
    pub question_id: Option<i64>,
    pub level: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            id: 1,
            question_text: "2 + 2?".into(),
            option_a: "3".into(),
            option_b: "4".into(),
            option_c: "5".into(),
            option_d: "22".into(),
            correct_option: "b".into(),
            level: Level::One,
        }
    }

    #[test]
    fn correct_option_letter_is_case_insensitive() {
        assert_eq!(sample().correct_answer(), "4");
    }

    #[test]
    fn unknown_letter_resolves_to_empty_text() {
        let mut q = sample();
        q.correct_option = "E".into();
        assert_eq!(q.correct_answer(), "");
    }

    #[test]
    fn grading_is_exact_and_case_sensitive() {
        let mut q = sample();
        q.option_b = "Paris".into();
        assert!(q.is_correct("Paris"));
        assert!(!q.is_correct("paris"));
        assert!(!q.is_correct(" Paris"));
        // the letter itself is not an accepted answer
        assert!(!q.is_correct("B"));
    }

    #[test]
    fn seed_question_rejects_bad_letter() {
        let new = NewQuestion {
            question_text: "Q".into(),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_option: "Z".into(),
            level: Level::Two,
        };
        assert!(new.validate().is_err());
    }
}
