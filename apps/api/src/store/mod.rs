//! Persistence adapter. Every read-modify-write in the service goes through
//! the `Store` trait so the backend can be swapped without touching the
//! assessment, recommendation or reporting logic.

pub mod json;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::cv::UserCv;
use crate::models::progress::CategoryProgress;
use crate::models::recommendation::{Recommendation, RecommendationProgress};
use crate::models::skill::Skill;
use crate::models::test::{Test, TestResult};
use crate::models::user::User;

pub use json::JsonStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Collection '{collection}' is corrupt: {reason}")]
    Corrupt { collection: String, reason: String },

    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Writes stored as one unit: either every part lands or none does.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// Inserted or replaced by id. Its email must not belong to another user.
    pub user: Option<User>,
    /// Appended to the user's history.
    pub result: Option<TestResult>,
    /// Replaces the user's whole skill list.
    pub skills: Option<(Uuid, Vec<Skill>)>,
    pub progress: Option<CategoryProgress>,
    pub cv: Option<UserCv>,
}

/// Per-entity persistence contract. Absence is `Ok(None)` or an empty list,
/// never an error. Writes to user aggregates go through `commit`; the
/// single-entity writes are one-part batches.
#[async_trait]
pub trait Store: Send + Sync {
    /// Applies every part of the batch, or none of them on error.
    async fn commit(&self, batch: &WriteBatch) -> StoreResult<()>;

    // --- Users ---
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Inserts or replaces the user with the same id.
    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.commit(&WriteBatch {
            user: Some(user.clone()),
            ..Default::default()
        })
        .await
    }
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    // --- Tests ---
    async fn get_test(&self, id: &str) -> StoreResult<Option<Test>>;
    async fn list_tests(&self) -> StoreResult<Vec<Test>>;

    // --- Test results (append-only) ---
    async fn append_test_result(&self, result: &TestResult) -> StoreResult<()> {
        self.commit(&WriteBatch {
            result: Some(result.clone()),
            ..Default::default()
        })
        .await
    }
    /// Newest first.
    async fn list_test_results(&self, user_id: Uuid) -> StoreResult<Vec<TestResult>>;

    // --- Skills ---
    async fn get_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>>;
    /// Replaces the user's whole skill list.
    async fn save_skills(&self, user_id: Uuid, skills: &[Skill]) -> StoreResult<()> {
        self.commit(&WriteBatch {
            skills: Some((user_id, skills.to_vec())),
            ..Default::default()
        })
        .await
    }

    // --- Category progress ---
    async fn get_category_progress(&self, user_id: Uuid) -> StoreResult<Option<CategoryProgress>>;
    async fn save_category_progress(&self, progress: &CategoryProgress) -> StoreResult<()> {
        self.commit(&WriteBatch {
            progress: Some(progress.clone()),
            ..Default::default()
        })
        .await
    }

    // --- Recommendations ---
    /// Catalog in insertion order.
    async fn list_recommendations(&self) -> StoreResult<Vec<Recommendation>>;
    /// Appends items whose id is not yet in the catalog. Returns how many were added.
    async fn append_recommendations(&self, items: &[Recommendation]) -> StoreResult<usize>;
    async fn list_recommendation_progress(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<RecommendationProgress>>;
    async fn save_recommendation_progress(&self, entry: &RecommendationProgress)
        -> StoreResult<()>;

    // --- CVs ---
    async fn get_cv(&self, user_id: Uuid) -> StoreResult<Option<UserCv>>;
    /// Overwrites the user's CV record wholesale.
    async fn save_cv(&self, cv: &UserCv) -> StoreResult<()> {
        self.commit(&WriteBatch {
            cv: Some(cv.clone()),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Reads from a real `JsonStore` while every commit fails, as a full disk would.
    pub struct FailingCommits {
        pub inner: JsonStore,
    }

    #[async_trait]
    impl Store for FailingCommits {
        async fn commit(&self, _batch: &WriteBatch) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )))
        }

        async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
            self.inner.get_user(id).await
        }

        async fn list_users(&self) -> StoreResult<Vec<User>> {
            self.inner.list_users().await
        }

        async fn get_test(&self, id: &str) -> StoreResult<Option<Test>> {
            self.inner.get_test(id).await
        }

        async fn list_tests(&self) -> StoreResult<Vec<Test>> {
            self.inner.list_tests().await
        }

        async fn list_test_results(&self, user_id: Uuid) -> StoreResult<Vec<TestResult>> {
            self.inner.list_test_results(user_id).await
        }

        async fn get_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>> {
            self.inner.get_skills(user_id).await
        }

        async fn get_category_progress(
            &self,
            user_id: Uuid,
        ) -> StoreResult<Option<CategoryProgress>> {
            self.inner.get_category_progress(user_id).await
        }

        async fn list_recommendations(&self) -> StoreResult<Vec<Recommendation>> {
            self.inner.list_recommendations().await
        }

        async fn append_recommendations(&self, items: &[Recommendation]) -> StoreResult<usize> {
            self.inner.append_recommendations(items).await
        }

        async fn list_recommendation_progress(
            &self,
            user_id: Uuid,
        ) -> StoreResult<Vec<RecommendationProgress>> {
            self.inner.list_recommendation_progress(user_id).await
        }

        async fn save_recommendation_progress(
            &self,
            entry: &RecommendationProgress,
        ) -> StoreResult<()> {
            self.inner.save_recommendation_progress(entry).await
        }

        async fn get_cv(&self, user_id: Uuid) -> StoreResult<Option<UserCv>> {
            self.inner.get_cv(user_id).await
        }
    }
}
