use serde::{Deserialize, Serialize};

/// A named skill score owned by a user. Unique per (user, name, category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: String,
    pub score: u8,
}

impl Skill {
    pub fn new(name: impl Into<String>, category: impl Into<String>, score: u8) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            score,
        }
    }
}
