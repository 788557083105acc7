use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
}

/// A catalog test. Questions are ordered; submissions address them by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub category: String,
    pub difficulty: String,
    pub questions: Vec<Question>,
}

/// Question index -> chosen option id.
pub type AnswerMap = BTreeMap<usize, String>;

/// One completed attempt. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: String,
    pub test_title: String,
    pub category: String,
    pub score: u8,
    pub answers: AnswerMap,
    pub taken_at: DateTime<Utc>,
}
