use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::accounts::{register, require_user, update_profile, ProfilePatch, RegisterRequest};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// POST /api/v1/users
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = register(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(require_user(state.store.as_ref(), user_id).await?))
}

/// PATCH /api/v1/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<User>, AppError> {
    let _guard = state.locks.acquire(user_id).await;
    let user = update_profile(state.store.as_ref(), user_id, patch).await?;
    Ok(Json(user))
}
