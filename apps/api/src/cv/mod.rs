pub mod analysis;
pub mod handlers;

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use crate::models::cv::UserCv;
use crate::models::user::User;
use crate::store::{Store, StoreResult, WriteBatch};

use analysis::{
    detect_skills, education_from_profile, extract_text, format_file_size, merge_cv_skills,
    sanitize_file_name, CvFormat,
};

/// A validated upload, ready to be stored and analyzed.
pub struct CvUpload {
    pub file_name: String,
    pub format: CvFormat,
    pub bytes: Bytes,
}

fn upload_path(uploads_dir: &Path, user: &User, file_name: &str) -> PathBuf {
    uploads_dir.join(user.id.to_string()).join(file_name)
}

/// Best effort: a leftover file is logged, never an error.
async fn remove_stored_file(path: &str) {
    if path.is_empty() {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove {}: {e}", path);
        }
    }
}

/// Stores the file, detects skills in it and replaces the user's CV record.
/// Detected skills are merged into the user's skill list in the same batch,
/// and the previous upload's file is removed. The caller holds the user's
/// lock.
pub async fn process_upload(
    store: &dyn Store,
    uploads_dir: &Path,
    user: &User,
    upload: CvUpload,
) -> StoreResult<UserCv> {
    let previous = store.get_cv(user.id).await?;
    let current_skills = store.get_skills(user.id).await?;
    let file_name = sanitize_file_name(&upload.file_name);
    let path = upload_path(uploads_dir, user, &file_name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &upload.bytes).await?;

    let size = upload.bytes.len() as u64;
    let text = extract_text(upload.format, upload.bytes).await;
    let skills = text
        .as_deref()
        .map(|t| detect_skills(t, &user.specialization))
        .unwrap_or_default();

    let now = Utc::now();
    let cv = UserCv {
        user_id: user.id,
        file_name,
        file_size: format_file_size(size),
        file_type: upload.format.mime().to_string(),
        file_path: path.to_string_lossy().into_owned(),
        uploaded_at: Some(now),
        skills,
        experience: Vec::new(),
        education: education_from_profile(user),
        last_analysis_at: text.is_some().then_some(now),
    };
    let skills = (!cv.skills.is_empty())
        .then(|| (user.id, merge_cv_skills(current_skills, &cv.skills)));

    let stored = store
        .commit(&WriteBatch {
            cv: Some(cv.clone()),
            skills,
            ..Default::default()
        })
        .await;
    if let Err(e) = stored {
        if previous.as_ref().map(|p| p.file_path.as_str()) != Some(cv.file_path.as_str()) {
            remove_stored_file(&cv.file_path).await;
        }
        return Err(e);
    }

    if let Some(previous) = previous {
        if previous.file_path != cv.file_path {
            remove_stored_file(&previous.file_path).await;
        }
    }

    info!(
        "Stored CV for user {} ({}, {} skills detected)",
        user.id,
        cv.file_size,
        cv.skills.len()
    );
    Ok(cv)
}

/// Replaces the CV record with an empty one. The record is kept, so a
/// cleared CV reads the same as one never uploaded.
pub async fn clear_cv(store: &dyn Store, user: &User) -> StoreResult<UserCv> {
    if let Some(previous) = store.get_cv(user.id).await? {
        remove_stored_file(&previous.file_path).await;
    }

    let empty = UserCv::empty(user.id);
    store.save_cv(&empty).await?;
    info!("Cleared CV for user {}", user.id);
    Ok(empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{register, RegisterRequest};
    use crate::models::skill::Skill;
    use crate::store::testing::FailingCommits;
    use crate::store::JsonStore;

    async fn setup() -> (tempfile::TempDir, JsonStore, User) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("data")).await.unwrap();
        let user = register(
            &store,
            RegisterRequest {
                name: "Ana".to_string(),
                email: "ana@x.io".to_string(),
                student_id: String::new(),
                career: "Computer Systems Engineering".to_string(),
                semester: String::new(),
                specialization: "Data Management".to_string(),
                bio: String::new(),
            },
        )
        .await
        .unwrap();
        (dir, store, user)
    }

    fn text_upload(body: &'static str) -> CvUpload {
        CvUpload {
            file_name: "my cv.txt".to_string(),
            format: CvFormat::Text,
            bytes: Bytes::from_static(body.as_bytes()),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_file_and_merges_skills() {
        let (dir, store, user) = setup().await;
        let uploads = dir.path().join("uploads");
        store
            .save_skills(user.id, &[Skill::new("SQL", "CV", 60)])
            .await
            .unwrap();

        let cv = process_upload(&store, &uploads, &user, text_upload("SQL, Docker and Git"))
            .await
            .unwrap();

        assert_eq!(cv.file_name, "my_cv.txt");
        assert_eq!(cv.file_type, "text/plain");
        assert_eq!(cv.skills, vec!["SQL", "Git", "Docker"]);
        assert_eq!(cv.education[0].specialization.as_deref(), Some("Data Management"));
        assert!(cv.last_analysis_at.is_some());
        assert!(uploads.join(user.id.to_string()).join("my_cv.txt").exists());

        let skills = store.get_skills(user.id).await.unwrap();
        assert_eq!(skills[0], Skill::new("SQL", "CV", 65));
        assert_eq!(skills.len(), 3);
        assert_eq!(store.get_cv(user.id).await.unwrap().unwrap(), cv);
    }

    #[tokio::test]
    async fn test_word_upload_is_stored_unparsed() {
        let (dir, store, user) = setup().await;
        let upload = CvUpload {
            file_name: "cv.docx".to_string(),
            format: CvFormat::Word,
            bytes: Bytes::from_static(b"PK\x03\x04"),
        };
        let cv = process_upload(&store, &dir.path().join("uploads"), &user, upload)
            .await
            .unwrap();

        assert!(cv.skills.is_empty());
        assert!(cv.last_analysis_at.is_none());
        assert!(store.get_skills(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reupload_replaces_previous_file() {
        let (dir, store, user) = setup().await;
        let uploads = dir.path().join("uploads");

        let first = process_upload(&store, &uploads, &user, text_upload("Python"))
            .await
            .unwrap();
        let second = CvUpload {
            file_name: "resume-2024.txt".to_string(),
            format: CvFormat::Text,
            bytes: Bytes::from_static(b"Python and Git"),
        };
        let second = process_upload(&store, &uploads, &user, second)
            .await
            .unwrap();

        assert!(!std::path::Path::new(&first.file_path).exists());
        assert!(std::path::Path::new(&second.file_path).exists());
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_state() {
        let (dir, inner, user) = setup().await;
        let uploads = dir.path().join("uploads");
        let store = FailingCommits { inner };

        assert!(process_upload(&store, &uploads, &user, text_upload("SQL and Git"))
            .await
            .is_err());

        assert!(store.get_cv(user.id).await.unwrap().unwrap().is_empty());
        assert!(store.get_skills(user.id).await.unwrap().is_empty());
        assert!(!upload_path(&uploads, &user, "my_cv.txt").exists());
    }

    #[tokio::test]
    async fn test_clear_writes_empty_record() {
        let (dir, store, user) = setup().await;
        let cv = process_upload(&store, &dir.path().join("uploads"), &user, text_upload("Python"))
            .await
            .unwrap();

        let cleared = clear_cv(&store, &user).await.unwrap();
        assert!(cleared.is_empty());
        assert!(store.get_cv(user.id).await.unwrap().unwrap().is_empty());
        assert!(!std::path::Path::new(&cv.file_path).exists());
    }
}
