use serde::Serialize;
use thiserror::Error;

use crate::models::test::{AnswerMap, Test};

use super::scoring::round_score;

/// A submission that does not fit the test it was sent to.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Question index {index} is out of range (test has {total} questions)")]
    UnknownQuestion { index: usize, total: usize },

    #[error("Option '{option}' is not offered by question {index}")]
    UnknownOption { index: usize, option: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scorecard {
    pub score: u8,
    pub correct_count: usize,
    pub total_count: usize,
}

/// Rejects answers addressed to questions or options the test does not have.
/// Unanswered questions are fine; they simply score as wrong.
pub fn validate_answers(test: &Test, answers: &AnswerMap) -> Result<(), SubmissionError> {
    let total = test.questions.len();
    for (&index, option) in answers {
        let question = test
            .questions
            .get(index)
            .ok_or(SubmissionError::UnknownQuestion { index, total })?;

        if !question.options.iter().any(|o| &o.id == option) {
            return Err(SubmissionError::UnknownOption {
                index,
                option: option.clone(),
            });
        }
    }
    Ok(())
}

/// Exact option-id comparison per question index. A test without questions
/// scores 0.
pub fn score(test: &Test, answers: &AnswerMap) -> Scorecard {
    let total_count = test.questions.len();
    let correct_count = test
        .questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i) == Some(&q.correct_answer))
        .count();

    let score = if total_count == 0 {
        0
    } else {
        round_score(100.0 * correct_count as f64 / total_count as f64)
    };

    Scorecard {
        score,
        correct_count,
        total_count,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public view (no answer key)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicTest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub category: String,
    pub difficulty: String,
    pub question_count: usize,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Test> for PublicTest {
    fn from(test: &Test) -> Self {
        Self {
            id: test.id.clone(),
            title: test.title.clone(),
            description: test.description.clone(),
            duration: test.duration.clone(),
            category: test.category.clone(),
            difficulty: test.difficulty.clone(),
            question_count: test.questions.len(),
            questions: test
                .questions
                .iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    prompt: q.prompt.clone(),
                    options: q
                        .options
                        .iter()
                        .map(|o| PublicOption {
                            id: o.id.clone(),
                            text: o.text.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
