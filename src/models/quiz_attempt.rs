// src/models/quiz_attempt.rs

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};

use crate::models::{level::Level, question::Question};

/// One submission event by a user. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub score: i64,
    pub submitted_at: DateTime<Utc>,
}

/// An answer to be stored together with its attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub question_id: i64,
    /// Selected option text as sent by the client.
    pub selected_option: String,
}

/// Raw score of one attempt that touched a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptScore {
    pub attempt_id: i64,
    pub score: i64,
}

/// The user's most recent attempt and the level of its first answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestAttempt {
    pub attempt_id: i64,
    pub score: i64,
    pub level: Level,
}

/// A stored answer joined with the question it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerDetail {
    pub answer_id: i64,
    pub attempt_id: i64,
    pub selected_option: String,
    pub question: Question,
}

/// Submitted answers in the order they appear in the request document.
///
/// Keys are question ids (JSON object keys, so strings holding integers).
/// A repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSheet(pub Vec<(i64, String)>);

impl AnswerSheet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn question_ids(&self) -> Vec<i64> {
        self.0.iter().map(|(id, _)| *id).collect()
    }

    fn insert(&mut self, question_id: i64, selected: String) {
        match self.0.iter_mut().find(|(id, _)| *id == question_id) {
            Some(entry) => entry.1 = selected,
            None => self.0.push((question_id, selected)),
        }
    }
}

impl<const N: usize> From<[(i64, &str); N]> for AnswerSheet {
    fn from(entries: [(i64, &str); N]) -> Self {
        let mut sheet = AnswerSheet::default();
        for (id, selected) in entries {
            sheet.insert(id, selected.to_string());
        }
        sheet
    }
}

impl<'de> Deserialize<'de> for AnswerSheet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SheetVisitor;

        impl<'de> Visitor<'de> for SheetVisitor {
            type Value = AnswerSheet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of question id to selected option text")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut sheet = AnswerSheet::default();
                while let Some((key, selected)) = access.next_entry::<String, String>()? {
                    let question_id = key.trim().parse::<i64>().map_err(|_| {
                        serde::de::Error::custom(format!("invalid question id '{}'", key))
                    })?;
                    sheet.insert(question_id, selected);
                }
                Ok(sheet)
            }
        }

        deserializer.deserialize_map(SheetVisitor)
    }
}

/// DTO for submitting a quiz.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub answers: AnswerSheet,
}

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResult {
    pub score: i64,
    pub total_questions: i64,
    /// Correct option text keyed by question id.
    pub correct_answers: BTreeMap<String, String>,
    pub percentage: f64,
    pub level_passed: bool,
    /// Level of the last graded question; `null` when nothing was graded.
    pub current_level: Option<Level>,
    pub next_level_unlocked: bool,
    pub is_perfect: bool,
}

/// One past attempt as shown in the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptSummary {
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: f64,
    pub level: Level,
    pub level_passed: bool,
    /// `%Y-%m-%d %H:%M`, UTC.
    pub submitted_at: String,
    pub answers: Vec<AnswerBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerBreakdown {
    pub question_id: i64,
    pub question_text: String,
    pub selected_option: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub level: Level,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_sheet_keeps_document_order() {
        let req: SubmitQuizRequest =
            serde_json::from_str(r#"{"answers": {"12": "x", "3": "y", "7": "z"}}"#).unwrap();
        assert_eq!(req.answers.question_ids(), vec![12, 3, 7]);
    }

    #[test]
    fn repeated_key_keeps_position_and_last_value() {
        let req: SubmitQuizRequest =
            serde_json::from_str(r#"{"answers": {"1": "a", "2": "b", "1": "c"}}"#).unwrap();
        assert_eq!(
            req.answers.0,
            vec![(1, "c".to_string()), (2, "b".to_string())]
        );
    }

    #[test]
    fn non_numeric_key_is_rejected() {
        let res = serde_json::from_str::<SubmitQuizRequest>(r#"{"answers": {"one": "a"}}"#);
        assert!(res.is_err());
    }

    #[test]
    fn missing_answers_is_an_empty_sheet() {
        let req: SubmitQuizRequest = serde_json::from_str("{}").unwrap();
        assert!(req.answers.is_empty());
    }
}
