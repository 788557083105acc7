use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::locks::UserLocks;
use crate::models::progress::CategoryProgress;
use crate::models::test::{AnswerMap, TestResult};
use crate::models::user::Level;
use crate::store::{Store, StoreError, WriteBatch};

use super::engine::{self, Scorecard, SubmissionError};
use super::{level, progress, skills};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Test '{0}' not found")]
    TestNotFound(String),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    #[serde(flatten)]
    pub scorecard: Scorecard,
    /// `None` for guest submissions, which are never persisted.
    pub result: Option<TestResult>,
    pub progress: Option<CategoryProgress>,
    pub level: Option<Level>,
}

/// Scores a submission and, for a known user, runs the full update chain:
/// result -> skills -> category progress -> level. Everything is computed
/// under the user's lock and stored as one batch, so a failed write leaves
/// no trace of the attempt.
pub async fn submit(
    store: &dyn Store,
    locks: &UserLocks,
    test_id: &str,
    user_id: Option<Uuid>,
    answers: AnswerMap,
) -> Result<SubmissionOutcome, PipelineError> {
    let test = store
        .get_test(test_id)
        .await?
        .ok_or_else(|| PipelineError::TestNotFound(test_id.to_string()))?;

    engine::validate_answers(&test, &answers)?;
    let scorecard = engine::score(&test, &answers);

    let Some(user_id) = user_id else {
        info!("Guest scored {} on test {}", scorecard.score, test.id);
        return Ok(SubmissionOutcome {
            scorecard,
            result: None,
            progress: None,
            level: None,
        });
    };

    let _guard = locks.acquire(user_id).await;
    let user = store
        .get_user(user_id)
        .await?
        .ok_or(PipelineError::UserNotFound(user_id))?;

    let result = TestResult {
        id: Uuid::new_v4(),
        user_id,
        test_id: test.id.clone(),
        test_title: test.title.clone(),
        category: test.category.clone(),
        score: scorecard.score,
        answers,
        taken_at: Utc::now(),
    };

    let skills = skills::apply_result(store.get_skills(user_id).await?, &result);
    let progress = progress::apply_result(
        store.get_category_progress(user_id).await?,
        user_id,
        &result,
    );

    let mut history = store.list_test_results(user_id).await?;
    history.insert(0, result.clone());
    let level = level::classify(&history, &skills);

    store
        .commit(&WriteBatch {
            user: level.map(|l| level::assign(user, l)),
            result: Some(result.clone()),
            skills: Some((user_id, skills)),
            progress: Some(progress.clone()),
            cv: None,
        })
        .await?;

    info!(
        "User {} scored {} on test {} ({})",
        user_id, result.score, test.id, test.category
    );

    Ok(SubmissionOutcome {
        scorecard,
        result: Some(result),
        progress: Some(progress),
        level,
    })
}
