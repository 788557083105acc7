use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::models::recommendation::{Recommendation, RecommendationProgress, UserRecommendation};
use crate::models::test::TestResult;
use crate::store::seed::recommendation;
use crate::store::{Store, StoreResult};

/// Score assumed for a category the user has never been tested on.
const UNTESTED_SCORE: f64 = 100.0;

/// Catalog items a specialization brings along at registration.
pub fn specialization_extras(specialization: &str) -> Vec<Recommendation> {
    match specialization {
        "Data Management" => vec![
            recommendation(
                "data-mgmt-1",
                "Course: Advanced SQL for Data Management",
                "Learn advanced SQL techniques to manage large volumes of data",
                "Databases",
                "Intermediate",
                "15 hours",
                "https://www.coursera.org/learn/sql-for-data-science",
                "Coursera",
            ),
            recommendation(
                "data-mgmt-2",
                "Project: Data Warehouse with ETL",
                "Build a complete data warehouse with ETL processes",
                "Databases",
                "Advanced",
                "25 hours",
                "https://www.udemy.com/course/data-warehouse-the-ultimate-guide/",
                "Udemy",
            ),
        ],
        "Cross-Platform Development" => vec![
            recommendation(
                "xplat-1",
                "Course: React Native for mobile apps",
                "Build cross-platform mobile applications with React Native",
                "Frontend",
                "Intermediate",
                "20 hours",
                "https://reactnative.dev/docs/getting-started",
                "Official documentation",
            ),
            recommendation(
                "xplat-2",
                "Project: Cross-platform app with Flutter",
                "Create an application that runs on iOS, Android and the web with Flutter",
                "Frontend",
                "Intermediate",
                "30 hours",
                "https://flutter.dev/learn",
                "Official documentation",
            ),
        ],
        _ => Vec::new(),
    }
}

/// Appends the specialization's extras, skipping ones already in the catalog.
pub async fn add_specialization_extras(store: &dyn Store, specialization: &str) -> StoreResult<usize> {
    let extras = specialization_extras(specialization);
    if extras.is_empty() {
        return Ok(0);
    }
    let added = store.append_recommendations(&extras).await?;
    if added > 0 {
        info!("Added {} catalog items for '{}'", added, specialization);
    }
    Ok(added)
}

/// Merges the user's progress entries onto catalog items.
pub fn with_overlay(
    catalog: Vec<Recommendation>,
    progress: &[RecommendationProgress],
) -> Vec<UserRecommendation> {
    catalog
        .into_iter()
        .map(|recommendation| {
            let entry = progress
                .iter()
                .find(|p| p.recommendation_id == recommendation.id);
            UserRecommendation {
                progress: entry.map(|p| p.progress),
                completed: entry.map(|p| p.completed).unwrap_or(false),
                recommendation,
            }
        })
        .collect()
}

/// Orders the whole catalog so items in the user's weakest categories come
/// first. Categories without results rank as if fully mastered; ties keep
/// catalog order.
pub fn rank_by_weakness(
    mut catalog: Vec<Recommendation>,
    results: &[TestResult],
) -> Vec<Recommendation> {
    if results.is_empty() {
        return catalog;
    }

    let mut totals: HashMap<String, (f64, f64)> = HashMap::new();
    for r in results {
        let entry = totals.entry(r.category.to_lowercase()).or_insert((0.0, 0.0));
        entry.0 += r.score as f64;
        entry.1 += 1.0;
    }
    let mean_of = |rec: &Recommendation| {
        totals
            .get(&rec.category.to_lowercase())
            .map(|(sum, count)| sum / count)
            .unwrap_or(UNTESTED_SCORE)
    };

    catalog.sort_by(|a, b| mean_of(a).partial_cmp(&mean_of(b)).unwrap_or(Ordering::Equal));
    catalog
}

async fn find_item(store: &dyn Store, recommendation_id: &str) -> StoreResult<bool> {
    Ok(store
        .list_recommendations()
        .await?
        .iter()
        .any(|r| r.id == recommendation_id))
}

async fn current_entry(
    store: &dyn Store,
    user_id: Uuid,
    recommendation_id: &str,
) -> StoreResult<RecommendationProgress> {
    Ok(store
        .list_recommendation_progress(user_id)
        .await?
        .into_iter()
        .find(|p| p.recommendation_id == recommendation_id)
        .unwrap_or(RecommendationProgress {
            user_id,
            recommendation_id: recommendation_id.to_string(),
            progress: 0,
            completed: false,
        }))
}

/// Records progress on a catalog item, clamped to 0..=100. Only `complete`
/// marks an item done; dropping below 100 reopens it. `None` if the item is
/// not in the catalog.
pub async fn update_progress(
    store: &dyn Store,
    user_id: Uuid,
    recommendation_id: &str,
    progress: i64,
) -> StoreResult<Option<RecommendationProgress>> {
    if !find_item(store, recommendation_id).await? {
        return Ok(None);
    }

    let mut entry = current_entry(store, user_id, recommendation_id).await?;
    entry.progress = progress.clamp(0, 100) as u8;
    entry.completed &= entry.progress == 100;
    store.save_recommendation_progress(&entry).await?;
    Ok(Some(entry))
}

/// Marks a catalog item done. `None` if the item is not in the catalog.
pub async fn complete(
    store: &dyn Store,
    user_id: Uuid,
    recommendation_id: &str,
) -> StoreResult<Option<RecommendationProgress>> {
    if !find_item(store, recommendation_id).await? {
        return Ok(None);
    }

    let mut entry = current_entry(store, user_id, recommendation_id).await?;
    entry.progress = 100;
    entry.completed = true;
    store.save_recommendation_progress(&entry).await?;
    Ok(Some(entry))
}
