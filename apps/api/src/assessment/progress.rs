use chrono::Utc;
use uuid::Uuid;

use crate::models::progress::CategoryProgress;
use crate::models::test::TestResult;

use super::scoring::{blend, mean, round_score, BlendWeights};

/// Rounded mean of every tracked category, 0 when nothing is tracked.
pub fn overall(progress: &CategoryProgress) -> u8 {
    mean(progress.categories.values().copied())
        .map(round_score)
        .unwrap_or(0)
}

/// Folds a result into the user's category progress, seeding it first if the
/// user has none. A category sitting at 0 is treated as having no data yet.
pub fn apply_result(
    progress: Option<CategoryProgress>,
    user_id: Uuid,
    result: &TestResult,
) -> CategoryProgress {
    let mut progress = progress.unwrap_or_else(|| CategoryProgress::seeded(user_id));

    let previous = progress
        .categories
        .get(&result.category)
        .copied()
        .filter(|v| *v > 0);
    let updated = blend(previous, result.score as f64, &BlendWeights::default());
    progress.categories.insert(result.category.clone(), updated);

    progress.overall = overall(&progress);
    progress.updated_at = Utc::now();
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(category: &str, score: u8) -> TestResult {
        TestResult {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            test_id: "1".to_string(),
            test_title: "t".to_string(),
            category: category.to_string(),
            score,
            answers: Default::default(),
            taken_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_result_seeds_and_assigns() {
        let id = Uuid::new_v4();
        let p = apply_result(None, id, &result("Frontend", 80));
        assert_eq!(p.user_id, id);
        assert_eq!(p.categories["Frontend"], 80);
        assert_eq!(p.categories.len(), 5);
        // 80 / 5
        assert_eq!(p.overall, 16);
    }

    #[test]
    fn test_second_result_blends() {
        let id = Uuid::new_v4();
        let p = apply_result(None, id, &result("Frontend", 80));
        let p = apply_result(Some(p), id, &result("Frontend", 40));
        // 80*0.3 + 40*0.7 = 52
        assert_eq!(p.categories["Frontend"], 52);
    }

    #[test]
    fn test_new_category_joins_overall() {
        let id = Uuid::new_v4();
        let p = apply_result(None, id, &result("Security", 60));
        assert_eq!(p.categories.len(), 6);
        assert_eq!(p.overall, 10);
    }

    #[test]
    fn test_overall_zero_without_data() {
        let mut p = CategoryProgress::seeded(Uuid::new_v4());
        assert_eq!(overall(&p), 0);
        p.categories = BTreeMap::new();
        assert_eq!(overall(&p), 0);
    }

    #[test]
    fn test_overall_stays_in_range() {
        let mut p = CategoryProgress::seeded(Uuid::new_v4());
        for v in p.categories.values_mut() {
            *v = 100;
        }
        assert_eq!(overall(&p), 100);
    }
}
