use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::seed::{default_catalog, default_tests};
use super::{Store, StoreError, StoreResult, WriteBatch};
use crate::models::cv::UserCv;
use crate::models::progress::CategoryProgress;
use crate::models::recommendation::{Recommendation, RecommendationProgress};
use crate::models::skill::Skill;
use crate::models::test::{Test, TestResult};
use crate::models::user::User;

const USERS: &str = "users.json";
const TESTS: &str = "tests.json";
const TEST_RESULTS: &str = "test-results.json";
const SKILLS: &str = "skills.json";
const PROGRESS: &str = "progress.json";
const RECOMMENDATIONS: &str = "recommendations.json";
const RECOMMENDATION_PROGRESS: &str = "recommendation-progress.json";
const USER_CVS: &str = "user-cvs.json";

const EMPTY_COLLECTIONS: &[&str] = &[
    USERS,
    TEST_RESULTS,
    SKILLS,
    PROGRESS,
    RECOMMENDATION_PROGRESS,
    USER_CVS,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SkillSet {
    user_id: Uuid,
    skills: Vec<Skill>,
}

/// One collection's file contents before and after a batch.
struct Staged {
    collection: &'static str,
    before: Vec<u8>,
    after: Vec<u8>,
}

fn upsert_by<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = item.clone(),
        None => items.push(item.clone()),
    }
}

fn upsert_user(users: &mut Vec<User>, user: &User) -> StoreResult<()> {
    if users
        .iter()
        .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
    {
        return Err(StoreError::DuplicateEmail(user.email.clone()));
    }
    upsert_by(users, user, |u| u.id == user.id);
    Ok(())
}

/// Flat-file backend: one JSON array per collection inside `dir`.
///
/// Every write replaces the whole file through a temp file and rename, so a
/// crash mid-write leaves the previous version intact. Writers are serialized
/// by an in-process mutex; several processes sharing one directory are not
/// supported.
pub struct JsonStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Creates the data directory if needed and seeds any missing collection.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let store = Self {
            dir,
            write_lock: Mutex::new(()),
        };

        if !store.exists(TESTS).await? {
            store.write(TESTS, &default_tests()).await?;
            info!("Seeded {}", TESTS);
        }
        if !store.exists(RECOMMENDATIONS).await? {
            store.write(RECOMMENDATIONS, &default_catalog()).await?;
            info!("Seeded {}", RECOMMENDATIONS);
        }
        for collection in EMPTY_COLLECTIONS {
            if !store.exists(collection).await? {
                store.write::<serde_json::Value>(collection, &[]).await?;
            }
        }

        info!("JSON store ready at {}", store.dir.display());
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(collection)
    }

    async fn exists(&self, collection: &str) -> StoreResult<bool> {
        Ok(tokio::fs::try_exists(self.path(collection)).await?)
    }

    /// A missing file reads as an empty collection.
    async fn read<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        let bytes = match tokio::fs::read(self.path(collection)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            collection: collection.to_string(),
            reason: e.to_string(),
        })
    }

    async fn write<T: Serialize>(&self, collection: &str, items: &[T]) -> StoreResult<()> {
        self.write_bytes(collection, serde_json::to_vec_pretty(items)?).await
    }

    async fn write_bytes(&self, collection: &str, bytes: Vec<u8>) -> StoreResult<()> {
        let dir = self.dir.clone();
        let path = self.path(collection);

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        debug!("Wrote {}", collection);
        Ok(())
    }

    /// Read-modify-write of one collection under the store's write lock.
    async fn update<T, R, F>(&self, collection: &str, f: F) -> StoreResult<R>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce(&mut Vec<T>) -> R + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<T> = self.read(collection).await?;
        let out = f(&mut items);
        self.write(collection, &items).await?;
        Ok(out)
    }

    /// Reads a collection and applies `f` in memory. Nothing is written.
    async fn stage<T, F>(&self, collection: &'static str, f: F) -> StoreResult<Staged>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce(&mut Vec<T>) -> StoreResult<()> + Send,
    {
        let mut items: Vec<T> = self.read(collection).await?;
        let before = serde_json::to_vec_pretty(&items)?;
        f(&mut items)?;
        Ok(Staged {
            collection,
            before,
            after: serde_json::to_vec_pretty(&items)?,
        })
    }

    /// Writes staged collections in order. If one fails, the ones already
    /// written are restored to their previous contents.
    async fn apply(&self, staged: Vec<Staged>) -> StoreResult<()> {
        for (i, step) in staged.iter().enumerate() {
            if let Err(e) = self.write_bytes(step.collection, step.after.clone()).await {
                for done in staged[..i].iter().rev() {
                    if let Err(undo) = self.write_bytes(done.collection, done.before.clone()).await {
                        error!("Could not roll back {}: {undo}", done.collection);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn commit(&self, batch: &WriteBatch) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut staged = Vec::new();

        if let Some(user) = &batch.user {
            staged.push(
                self.stage(USERS, |users: &mut Vec<User>| upsert_user(users, user))
                    .await?,
            );
        }
        if let Some((user_id, skills)) = &batch.skills {
            let set = SkillSet {
                user_id: *user_id,
                skills: skills.clone(),
            };
            staged.push(
                self.stage(SKILLS, |sets: &mut Vec<SkillSet>| {
                    upsert_by(sets, &set, |s| s.user_id == set.user_id);
                    Ok(())
                })
                .await?,
            );
        }
        if let Some(progress) = &batch.progress {
            staged.push(
                self.stage(PROGRESS, |all: &mut Vec<CategoryProgress>| {
                    upsert_by(all, progress, |p| p.user_id == progress.user_id);
                    Ok(())
                })
                .await?,
            );
        }
        if let Some(cv) = &batch.cv {
            staged.push(
                self.stage(USER_CVS, |cvs: &mut Vec<UserCv>| {
                    upsert_by(cvs, cv, |c| c.user_id == cv.user_id);
                    Ok(())
                })
                .await?,
            );
        }
        // History is written last so it never gets ahead of the aggregates.
        if let Some(result) = &batch.result {
            staged.push(
                self.stage(TEST_RESULTS, |results: &mut Vec<TestResult>| {
                    results.insert(0, result.clone());
                    Ok(())
                })
                .await?,
            );
        }

        self.apply(staged).await
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users: Vec<User> = self.read(USERS).await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.read(USERS).await
    }

    async fn get_test(&self, id: &str) -> StoreResult<Option<Test>> {
        let tests: Vec<Test> = self.read(TESTS).await?;
        Ok(tests.into_iter().find(|t| t.id == id))
    }

    async fn list_tests(&self) -> StoreResult<Vec<Test>> {
        self.read(TESTS).await
    }

    async fn list_test_results(&self, user_id: Uuid) -> StoreResult<Vec<TestResult>> {
        let results: Vec<TestResult> = self.read(TEST_RESULTS).await?;
        Ok(results
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect())
    }

    async fn get_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>> {
        let sets: Vec<SkillSet> = self.read(SKILLS).await?;
        Ok(sets
            .into_iter()
            .find(|s| s.user_id == user_id)
            .map(|s| s.skills)
            .unwrap_or_default())
    }

    async fn get_category_progress(&self, user_id: Uuid) -> StoreResult<Option<CategoryProgress>> {
        let all: Vec<CategoryProgress> = self.read(PROGRESS).await?;
        Ok(all.into_iter().find(|p| p.user_id == user_id))
    }

    async fn list_recommendations(&self) -> StoreResult<Vec<Recommendation>> {
        self.read(RECOMMENDATIONS).await
    }

    async fn append_recommendations(&self, items: &[Recommendation]) -> StoreResult<usize> {
        self.update(RECOMMENDATIONS, |catalog: &mut Vec<Recommendation>| {
            let mut added = 0;
            for item in items {
                if !catalog.iter().any(|r| r.id == item.id) {
                    catalog.push(item.clone());
                    added += 1;
                }
            }
            added
        })
        .await
    }

    async fn list_recommendation_progress(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<RecommendationProgress>> {
        let all: Vec<RecommendationProgress> = self.read(RECOMMENDATION_PROGRESS).await?;
        Ok(all.into_iter().filter(|p| p.user_id == user_id).collect())
    }

    async fn save_recommendation_progress(
        &self,
        entry: &RecommendationProgress,
    ) -> StoreResult<()> {
        self.update(RECOMMENDATION_PROGRESS, |all: &mut Vec<RecommendationProgress>| {
            upsert_by(all, entry, |p| {
                p.user_id == entry.user_id && p.recommendation_id == entry.recommendation_id
            })
        })
        .await
    }

    async fn get_cv(&self, user_id: Uuid) -> StoreResult<Option<UserCv>> {
        let cvs: Vec<UserCv> = self.read(USER_CVS).await?;
        Ok(cvs.into_iter().find(|c| c.user_id == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Level;
    use chrono::{Duration, Utc};

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: email.to_string(),
            student_id: String::new(),
            career: String::new(),
            semester: String::new(),
            specialization: String::new(),
            bio: String::new(),
            level: Level::Beginner,
            created_at: Utc::now(),
        }
    }

    fn result(user_id: Uuid, score: u8, minutes_ago: i64) -> TestResult {
        TestResult {
            id: Uuid::new_v4(),
            user_id,
            test_id: "1".to_string(),
            test_title: "Frontend Basics".to_string(),
            category: "Frontend".to_string(),
            score,
            answers: Default::default(),
            taken_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_open_seeds_tests_and_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        assert_eq!(store.list_tests().await.unwrap().len(), 2);
        assert_eq!(
            store.list_recommendations().await.unwrap().len(),
            default_catalog().len()
        );
        assert!(store.list_users().await.unwrap().is_empty());
        assert!(dir.path().join(USER_CVS).exists());
    }

    #[tokio::test]
    async fn test_open_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonStore::open(dir.path()).await.unwrap();
            store.save_user(&user("a@x.io")).await.unwrap();
        }
        let reopened = JsonStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_user_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        let mut u = user("a@x.io");
        store.save_user(&u).await.unwrap();
        u.level = Level::Advanced;
        store.save_user(&u).await.unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].level, Level::Advanced);
        assert!(store.get_user(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_results_are_listed_newest_first_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.append_test_result(&result(me, 40, 10)).await.unwrap();
        store.append_test_result(&result(other, 90, 5)).await.unwrap();
        store.append_test_result(&result(me, 80, 0)).await.unwrap();

        let mine = store.list_test_results(me).await.unwrap();
        assert_eq!(mine.iter().map(|r| r.score).collect::<Vec<_>>(), vec![80, 40]);
    }

    #[tokio::test]
    async fn test_save_skills_replaces_whole_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let id = Uuid::new_v4();

        assert!(store.get_skills(id).await.unwrap().is_empty());
        store
            .save_skills(id, &[Skill::new("HTML", "Frontend", 50), Skill::new("CSS", "Frontend", 40)])
            .await
            .unwrap();
        store
            .save_skills(id, &[Skill::new("Git", "DevOps", 70)])
            .await
            .unwrap();

        assert_eq!(
            store.get_skills(id).await.unwrap(),
            vec![Skill::new("Git", "DevOps", 70)]
        );
    }

    #[tokio::test]
    async fn test_append_recommendations_skips_known_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let before = store.list_recommendations().await.unwrap();

        let mut fresh = before[0].clone();
        fresh.id = "extra-1".to_string();
        let added = store
            .append_recommendations(&[before[0].clone(), fresh])
            .await
            .unwrap();

        assert_eq!(added, 1);
        let after = store.list_recommendations().await.unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.last().unwrap().id, "extra-1");
    }

    #[tokio::test]
    async fn test_recommendation_progress_is_keyed_by_user_and_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let id = Uuid::new_v4();

        let mut entry = RecommendationProgress {
            user_id: id,
            recommendation_id: "1".to_string(),
            progress: 30,
            completed: false,
        };
        store.save_recommendation_progress(&entry).await.unwrap();
        entry.progress = 100;
        entry.completed = true;
        store.save_recommendation_progress(&entry).await.unwrap();

        let all = store.list_recommendation_progress(id).await.unwrap();
        assert_eq!(all, vec![entry]);
    }

    #[tokio::test]
    async fn test_commit_writes_every_part() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let u = user("a@x.io");

        store
            .commit(&WriteBatch {
                user: Some(u.clone()),
                result: Some(result(u.id, 60, 0)),
                skills: Some((u.id, vec![Skill::new("HTML", "Frontend", 60)])),
                progress: Some(CategoryProgress::seeded(u.id)),
                cv: Some(UserCv::empty(u.id)),
            })
            .await
            .unwrap();

        assert!(store.get_user(u.id).await.unwrap().is_some());
        assert_eq!(store.list_test_results(u.id).await.unwrap().len(), 1);
        assert_eq!(store.get_skills(u.id).await.unwrap().len(), 1);
        assert!(store.get_category_progress(u.id).await.unwrap().is_some());
        assert!(store.get_cv(u.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejected_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        store.save_user(&user("a@x.io")).await.unwrap();

        let intruder = user("A@x.io");
        let err = store
            .commit(&WriteBatch {
                user: Some(intruder.clone()),
                result: Some(result(intruder.id, 90, 0)),
                skills: Some((intruder.id, vec![Skill::new("Git", "DevOps", 90)])),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateEmail(_)));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
        assert!(store.list_test_results(intruder.id).await.unwrap().is_empty());
        assert!(store.get_skills(intruder.id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_keep_emails_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonStore::open(dir.path()).await.unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.save_user(&user("dup@x.io")).await })
            })
            .collect();

        let mut saved = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => saved += 1,
                Err(e) => assert!(matches!(e, StoreError::DuplicateEmail(_))),
            }
        }
        assert_eq!(saved, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join(USERS), b"{not json").unwrap();

        match store.list_users().await {
            Err(StoreError::Corrupt { collection, .. }) => assert_eq!(collection, USERS),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }
}
