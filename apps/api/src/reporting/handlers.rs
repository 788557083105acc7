use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::require_user;
use crate::errors::AppError;
use crate::reporting::performance::{report, CategoryPerformance};
use crate::reporting::statistics::{summarize, StatisticsSummary, TimeRange};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: TimeRange,
}

/// GET /api/v1/users/:id/performance
pub async fn handle_performance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CategoryPerformance>>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let skills = state.store.get_skills(user_id).await?;
    let results = state.store.list_test_results(user_id).await?;
    Ok(Json(report(&skills, &results)))
}

/// GET /api/v1/users/:id/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<StatisticsSummary>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let skills = state.store.get_skills(user_id).await?;
    let results = state.store.list_test_results(user_id).await?;
    let performance = report(&skills, &results);

    Ok(Json(summarize(
        &results,
        &performance,
        &skills,
        params.range,
        Utc::now(),
    )))
}
