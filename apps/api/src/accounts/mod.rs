pub mod handlers;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cv::UserCv;
use crate::models::progress::CategoryProgress;
use crate::models::user::{Level, User};
use crate::recommendations::catalog::add_specialization_extras;
use crate::store::{Store, StoreError, WriteBatch};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AccountError::DuplicateEmail(email),
            other => AccountError::Store(other),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => AppError::Validation(msg),
            AccountError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            AccountError::NotFound(_) => AppError::NotFound(err.to_string()),
            AccountError::Store(e) => AppError::Persistence(e),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub career: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub bio: String,
}

/// Only the fields present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub career: Option<String>,
    pub semester: Option<String>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
}

/// Fetches a user or fails with `NotFound`.
pub async fn require_user(store: &dyn Store, user_id: Uuid) -> Result<User, AppError> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

fn validate_name(name: &str) -> Result<(), AccountError> {
    if name.trim().is_empty() {
        return Err(AccountError::Validation("Name must not be empty".to_string()));
    }
    Ok(())
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AccountError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

/// Records every new user starts with: empty skills, an empty CV and zeroed
/// category progress, stored together with the user.
fn initial_records(user: User) -> WriteBatch {
    let id = user.id;
    WriteBatch {
        user: Some(user),
        result: None,
        skills: Some((id, Vec::new())),
        progress: Some(CategoryProgress::seeded(id)),
        cv: Some(UserCv::empty(id)),
    }
}

pub async fn register(store: &dyn Store, req: RegisterRequest) -> Result<User, AccountError> {
    validate_name(&req.name)?;
    let email = normalize_email(&req.email)?;

    let user = User {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email,
        student_id: req.student_id,
        career: req.career,
        semester: req.semester,
        specialization: req.specialization,
        bio: req.bio,
        level: Level::Beginner,
        created_at: Utc::now(),
    };

    // Catalog extras are shared and idempotent, so they may land even if the
    // user insert is then rejected.
    add_specialization_extras(store, &user.specialization).await?;
    store.commit(&initial_records(user.clone())).await?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok(user)
}

pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    patch: ProfilePatch,
) -> Result<User, AccountError> {
    let mut user = store
        .get_user(user_id)
        .await?
        .ok_or(AccountError::NotFound(user_id))?;

    if let Some(name) = patch.name {
        validate_name(&name)?;
        user.name = name.trim().to_string();
    }
    if let Some(email) = patch.email {
        user.email = normalize_email(&email)?;
    }
    if let Some(v) = patch.student_id {
        user.student_id = v;
    }
    if let Some(v) = patch.career {
        user.career = v;
    }
    if let Some(v) = patch.semester {
        user.semester = v;
    }
    if let Some(v) = patch.specialization {
        user.specialization = v;
    }
    if let Some(v) = patch.bio {
        user.bio = v;
    }

    store.save_user(&user).await?;
    Ok(user)
}
