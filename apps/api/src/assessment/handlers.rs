use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::require_user;
use crate::assessment::engine::PublicTest;
use crate::assessment::pipeline::{submit, SubmissionOutcome};
use crate::errors::AppError;
use crate::models::progress::CategoryProgress;
use crate::models::skill::Skill;
use crate::models::test::{AnswerMap, TestResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    /// Absent for guests; their attempt is scored but not stored.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub answers: AnswerMap,
}

/// GET /api/v1/tests
pub async fn handle_list_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicTest>>, AppError> {
    let tests = state.store.list_tests().await?;
    Ok(Json(tests.iter().map(PublicTest::from).collect()))
}

/// GET /api/v1/tests/:id
pub async fn handle_get_test(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<PublicTest>, AppError> {
    let test = state
        .store
        .get_test(&test_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test '{test_id}' not found")))?;
    Ok(Json(PublicTest::from(&test)))
}

/// POST /api/v1/tests/:id/submit
pub async fn handle_submit_test(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    let outcome = submit(
        state.store.as_ref(),
        &state.locks,
        &test_id,
        req.user_id,
        req.answers,
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/users/:id/results
pub async fn handle_list_results(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<TestResult>>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    Ok(Json(state.store.list_test_results(user_id).await?))
}

/// GET /api/v1/users/:id/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Skill>>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    Ok(Json(state.store.get_skills(user_id).await?))
}

/// GET /api/v1/users/:id/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CategoryProgress>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let progress = state
        .store
        .get_category_progress(user_id)
        .await?
        .unwrap_or_else(|| CategoryProgress::seeded(user_id));
    Ok(Json(progress))
}
