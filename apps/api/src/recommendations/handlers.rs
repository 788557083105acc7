use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::require_user;
use crate::errors::AppError;
use crate::models::recommendation::{RecommendationProgress, UserRecommendation};
use crate::recommendations::catalog::{complete, rank_by_weakness, update_progress, with_overlay};
use crate::recommendations::selector::select;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct ProgressRequest {
    pub progress: i64,
}

/// GET /api/v1/users/:id/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<UserRecommendation>>, AppError> {
    let user = require_user(state.store.as_ref(), user_id).await?;
    let catalog = state.store.list_recommendations().await?;
    let results = state.store.list_test_results(user_id).await?;
    let progress = state.store.list_recommendation_progress(user_id).await?;

    let limit = params.limit.unwrap_or(state.config.recommendation_limit);
    let mut selected = select(&user, &catalog, &results);
    selected.truncate(limit);

    Ok(Json(with_overlay(selected, &progress)))
}

/// GET /api/v1/users/:id/recommendations/catalog
pub async fn handle_catalog(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<UserRecommendation>>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let catalog = state.store.list_recommendations().await?;
    let results = state.store.list_test_results(user_id).await?;
    let progress = state.store.list_recommendation_progress(user_id).await?;

    Ok(Json(with_overlay(
        rank_by_weakness(catalog, &results),
        &progress,
    )))
}

/// PUT /api/v1/users/:id/recommendations/:rec_id/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Path((user_id, rec_id)): Path<(Uuid, String)>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<RecommendationProgress>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let entry = update_progress(state.store.as_ref(), user_id, &rec_id, req.progress)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recommendation '{rec_id}' not found")))?;
    Ok(Json(entry))
}

/// POST /api/v1/users/:id/recommendations/:rec_id/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    Path((user_id, rec_id)): Path<(Uuid, String)>,
) -> Result<Json<RecommendationProgress>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let entry = complete(state.store.as_ref(), user_id, &rec_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recommendation '{rec_id}' not found")))?;
    Ok(Json(entry))
}
