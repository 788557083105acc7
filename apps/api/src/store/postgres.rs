use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::seed::{default_catalog, default_tests};
use super::{Store, StoreError, StoreResult, WriteBatch};
use crate::models::cv::UserCv;
use crate::models::progress::CategoryProgress;
use crate::models::recommendation::{Recommendation, RecommendationProgress};
use crate::models::skill::Skill;
use crate::models::test::{AnswerMap, Test, TestResult};
use crate::models::user::{Level, User};

// ────────────────────────────────────────────────────────────────────────────
// Rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    student_id: String,
    career: String,
    semester: String,
    specialization: String,
    bio: String,
    level: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            student_id: row.student_id,
            career: row.career,
            semester: row.semester,
            specialization: row.specialization,
            bio: row.bio,
            level: Level::parse(&row.level).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TestRow {
    data: Json<Test>,
}

#[derive(Debug, FromRow)]
struct TestResultRow {
    id: Uuid,
    user_id: Uuid,
    test_id: String,
    test_title: String,
    category: String,
    score: i16,
    answers: Json<AnswerMap>,
    taken_at: DateTime<Utc>,
}

impl From<TestResultRow> for TestResult {
    fn from(row: TestResultRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            test_id: row.test_id,
            test_title: row.test_title,
            category: row.category,
            score: to_score(row.score),
            answers: row.answers.0,
            taken_at: row.taken_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SkillRow {
    name: String,
    category: String,
    score: i16,
}

#[derive(Debug, FromRow)]
struct ProgressRow {
    user_id: Uuid,
    categories: Json<BTreeMap<String, u8>>,
    overall: i16,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RecommendationProgressRow {
    user_id: Uuid,
    recommendation_id: String,
    progress: i16,
    completed: bool,
}

#[derive(Debug, FromRow)]
struct CvRow {
    data: Json<UserCv>,
}

fn to_score(value: i16) -> u8 {
    value.clamp(0, 100) as u8
}

/// `users.email` is the only unique column a batch can collide on.
fn email_conflict(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => err.into(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Batch statements
// ────────────────────────────────────────────────────────────────────────────

async fn upsert_user(conn: &mut PgConnection, user: &User) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users
            (id, name, email, student_id, career, semester, specialization, bio, level, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            student_id = EXCLUDED.student_id,
            career = EXCLUDED.career,
            semester = EXCLUDED.semester,
            specialization = EXCLUDED.specialization,
            bio = EXCLUDED.bio,
            level = EXCLUDED.level
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.student_id)
    .bind(&user.career)
    .bind(&user.semester)
    .bind(&user.specialization)
    .bind(&user.bio)
    .bind(user.level.as_str())
    .bind(user.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| email_conflict(e, &user.email))?;
    Ok(())
}

async fn insert_result(conn: &mut PgConnection, result: &TestResult) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO test_results
            (id, user_id, test_id, test_title, category, score, answers, taken_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(result.id)
    .bind(result.user_id)
    .bind(&result.test_id)
    .bind(&result.test_title)
    .bind(&result.category)
    .bind(result.score as i16)
    .bind(Json(&result.answers))
    .bind(result.taken_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn replace_skills(conn: &mut PgConnection, user_id: Uuid, skills: &[Skill]) -> StoreResult<()> {
    sqlx::query("DELETE FROM skills WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for (position, skill) in skills.iter().enumerate() {
        sqlx::query(
            "INSERT INTO skills (user_id, name, category, score, position) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(&skill.name)
        .bind(&skill.category)
        .bind(skill.score as i16)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn upsert_progress(conn: &mut PgConnection, progress: &CategoryProgress) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO category_progress (user_id, categories, overall, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO UPDATE SET
            categories = EXCLUDED.categories,
            overall = EXCLUDED.overall,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(progress.user_id)
    .bind(Json(&progress.categories))
    .bind(progress.overall as i16)
    .bind(progress.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_cv(conn: &mut PgConnection, cv: &UserCv) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_cvs (user_id, data) VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data
        "#,
    )
    .bind(cv.user_id)
    .bind(Json(cv))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// PostgreSQL backend. Nested documents (test bodies, answers, CVs) are JSONB.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects, applies embedded migrations and seeds the default catalog.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");

        let store = Self { pool };
        store.seed_defaults().await?;
        Ok(store)
    }

    async fn seed_defaults(&self) -> StoreResult<()> {
        for (position, test) in default_tests().into_iter().enumerate() {
            sqlx::query(
                "INSERT INTO tests (id, position, data) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
            )
            .bind(&test.id)
            .bind(position as i32)
            .bind(Json(&test))
            .execute(&self.pool)
            .await?;
        }

        let added = self.append_recommendations(&default_catalog()).await?;
        if added > 0 {
            info!("Seeded {} recommendations", added);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn commit(&self, batch: &WriteBatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(user) = &batch.user {
            upsert_user(&mut *tx, user).await?;
        }
        if let Some(result) = &batch.result {
            insert_result(&mut *tx, result).await?;
        }
        if let Some((user_id, skills)) = &batch.skills {
            replace_skills(&mut *tx, *user_id, skills).await?;
        }
        if let Some(progress) = &batch.progress {
            upsert_progress(&mut *tx, progress).await?;
        }
        if let Some(cv) = &batch.cv {
            upsert_cv(&mut *tx, cv).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_test(&self, id: &str) -> StoreResult<Option<Test>> {
        let row = sqlx::query_as::<_, TestRow>("SELECT data FROM tests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.data.0))
    }

    async fn list_tests(&self) -> StoreResult<Vec<Test>> {
        let rows = sqlx::query_as::<_, TestRow>("SELECT data FROM tests ORDER BY position ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.data.0).collect())
    }

    async fn list_test_results(&self, user_id: Uuid) -> StoreResult<Vec<TestResult>> {
        let rows = sqlx::query_as::<_, TestResultRow>(
            r#"
            SELECT id, user_id, test_id, test_title, category, score, answers, taken_at
            FROM test_results
            WHERE user_id = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TestResult::from).collect())
    }

    async fn get_skills(&self, user_id: Uuid) -> StoreResult<Vec<Skill>> {
        let rows = sqlx::query_as::<_, SkillRow>(
            "SELECT name, category, score FROM skills WHERE user_id = $1 ORDER BY position ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Skill::new(r.name, r.category, to_score(r.score)))
            .collect())
    }

    async fn get_category_progress(&self, user_id: Uuid) -> StoreResult<Option<CategoryProgress>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT user_id, categories, overall, updated_at FROM category_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| CategoryProgress {
            user_id: r.user_id,
            categories: r.categories.0,
            overall: to_score(r.overall),
            updated_at: r.updated_at,
        }))
    }

    async fn list_recommendations(&self) -> StoreResult<Vec<Recommendation>> {
        Ok(sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, title, description, category, difficulty, duration, url, platform
            FROM recommendations
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_recommendations(&self, items: &[Recommendation]) -> StoreResult<usize> {
        let mut added = 0;
        for item in items {
            let done = sqlx::query(
                r#"
                INSERT INTO recommendations
                    (id, title, description, category, difficulty, duration, url, platform)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.category)
            .bind(&item.difficulty)
            .bind(&item.duration)
            .bind(&item.url)
            .bind(&item.platform)
            .execute(&self.pool)
            .await?;
            added += done.rows_affected() as usize;
        }
        Ok(added)
    }

    async fn list_recommendation_progress(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<RecommendationProgress>> {
        let rows = sqlx::query_as::<_, RecommendationProgressRow>(
            "SELECT * FROM recommendation_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| RecommendationProgress {
                user_id: r.user_id,
                recommendation_id: r.recommendation_id,
                progress: to_score(r.progress),
                completed: r.completed,
            })
            .collect())
    }

    async fn save_recommendation_progress(
        &self,
        entry: &RecommendationProgress,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recommendation_progress (user_id, recommendation_id, progress, completed)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, recommendation_id) DO UPDATE SET
                progress = EXCLUDED.progress,
                completed = EXCLUDED.completed
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.recommendation_id)
        .bind(entry.progress as i16)
        .bind(entry.completed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_cv(&self, user_id: Uuid) -> StoreResult<Option<UserCv>> {
        let row = sqlx::query_as::<_, CvRow>("SELECT data FROM user_cvs WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.data.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_score_clamps_out_of_range_values() {
        assert_eq!(to_score(-3), 0);
        assert_eq!(to_score(42), 42);
        assert_eq!(to_score(250), 100);
    }

    #[test]
    fn test_unknown_level_text_falls_back_to_beginner() {
        let row = UserRow {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@x.io".to_string(),
            student_id: String::new(),
            career: String::new(),
            semester: String::new(),
            specialization: String::new(),
            bio: String::new(),
            level: "Expert".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(User::from(row).level, Level::Beginner);
    }
}
