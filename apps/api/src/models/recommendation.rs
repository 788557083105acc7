use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A learning resource from the shared catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub platform: String,
}

/// Per-user overlay on a catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationProgress {
    pub user_id: Uuid,
    pub recommendation_id: String,
    pub progress: u8,
    pub completed: bool,
}

/// A catalog item merged with the caller's overlay, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub progress: Option<u8>,
    pub completed: bool,
}
