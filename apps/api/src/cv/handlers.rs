use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::accounts::require_user;
use crate::cv::analysis::CvFormat;
use crate::cv::{clear_cv, process_upload, CvUpload};
use crate::errors::AppError;
use crate::models::cv::UserCv;
use crate::state::AppState;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// GET /api/v1/users/:id/cv
pub async fn handle_get_cv(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserCv>, AppError> {
    require_user(state.store.as_ref(), user_id).await?;
    let cv = state
        .store
        .get_cv(user_id)
        .await?
        .unwrap_or_else(|| UserCv::empty(user_id));
    Ok(Json(cv))
}

/// POST /api/v1/users/:id/cv
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UserCv>), AppError> {
    let user = require_user(state.store.as_ref(), user_id).await?;
    let max_bytes = state.config.max_cv_bytes;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("cv").to_string();
        let content_type = field.content_type().map(str::to_string);
        let format = CvFormat::detect(content_type.as_deref(), &file_name).ok_or_else(|| {
            AppError::UnsupportedMediaType(
                "Upload a PDF, plain text or Word document".to_string(),
            )
        })?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "CV must be at most {max_bytes} bytes"
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        upload = Some(CvUpload {
            file_name,
            format,
            bytes,
        });
        break;
    }

    let upload = upload.ok_or_else(|| {
        AppError::Validation(format!("Multipart field '{FILE_FIELD}' is required"))
    })?;

    let _guard = state.locks.acquire(user_id).await;
    let cv = process_upload(
        state.store.as_ref(),
        &state.config.uploads_dir,
        &user,
        upload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(cv)))
}

/// DELETE /api/v1/users/:id/cv
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserCv>, AppError> {
    let user = require_user(state.store.as_ref(), user_id).await?;
    let _guard = state.locks.acquire(user_id).await;
    Ok(Json(clear_cv(state.store.as_ref(), &user).await?))
}
