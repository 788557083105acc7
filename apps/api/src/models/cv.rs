use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub specialization: Option<String>,
}

/// At most one per user. Deleting a CV stores an empty record rather than
/// removing it, so "never uploaded" and "cleared" look the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCv {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_size: String,
    pub file_type: String,
    pub file_path: String,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub last_analysis_at: Option<DateTime<Utc>>,
}

impl UserCv {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            file_name: String::new(),
            file_size: String::new(),
            file_type: String::new(),
            file_path: String::new(),
            uploaded_at: None,
            skills: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            last_analysis_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() && self.skills.is_empty() && self.uploaded_at.is_none()
    }
}
