use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categories every new user starts with, all at zero.
pub const SEEDED_CATEGORIES: &[&str] = &["Frontend", "Backend", "Databases", "Algorithms", "DevOps"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub user_id: Uuid,
    pub categories: BTreeMap<String, u8>,
    pub overall: u8,
    pub updated_at: DateTime<Utc>,
}

impl CategoryProgress {
    pub fn seeded(user_id: Uuid) -> Self {
        Self {
            user_id,
            categories: SEEDED_CATEGORIES
                .iter()
                .map(|c| (c.to_string(), 0))
                .collect(),
            overall: 0,
            updated_at: Utc::now(),
        }
    }
}
