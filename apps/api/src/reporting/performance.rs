use serde::Serialize;

use crate::assessment::scoring::{mean, round_score};
use crate::models::progress::SEEDED_CATEGORIES;
use crate::models::skill::Skill;
use crate::models::test::TestResult;

/// Sentinel for `last_test` when a category has no results.
pub const NO_TEST: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillScore {
    pub name: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub title: String,
    pub score: u8,
    /// Newest minus second-newest result score in the category.
    pub change: i16,
    pub tests: usize,
    /// RFC 3339 timestamp of the newest result, or "N/A".
    pub last_test: String,
    pub skills: Vec<SkillScore>,
}

fn category_report(category: &str, skills: &[Skill], results: &[TestResult]) -> CategoryPerformance {
    let own_skills: Vec<&Skill> = skills.iter().filter(|s| s.category == category).collect();

    let mut own_results: Vec<&TestResult> =
        results.iter().filter(|r| r.category == category).collect();
    own_results.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));

    let change = match own_results.as_slice() {
        [newest, previous, ..] => newest.score as i16 - previous.score as i16,
        _ => 0,
    };

    CategoryPerformance {
        title: category.to_string(),
        score: mean(own_skills.iter().map(|s| s.score))
            .map(round_score)
            .unwrap_or(0),
        change,
        tests: own_results.len(),
        last_test: own_results
            .first()
            .map(|r| r.taken_at.to_rfc3339())
            .unwrap_or_else(|| NO_TEST.to_string()),
        skills: own_skills
            .iter()
            .map(|s| SkillScore {
                name: s.name.clone(),
                score: s.score,
            })
            .collect(),
    }
}

/// Per-category dashboard summary over the five core categories, in fixed order.
pub fn report(skills: &[Skill], results: &[TestResult]) -> Vec<CategoryPerformance> {
    SEEDED_CATEGORIES
        .iter()
        .map(|category| category_report(category, skills, results))
        .collect()
}
