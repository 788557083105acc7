use tracing::{debug, warn};

use crate::models::skill::Skill;
use crate::models::test::TestResult;

use super::scoring::{blend, BlendWeights};

/// Skills a test category feeds, most central first.
pub const CATEGORY_SKILLS: &[(&str, &[&str])] = &[
    ("Frontend", &["HTML", "CSS", "JavaScript", "React"]),
    ("Backend", &["Node.js", "Express", "REST APIs", "Authentication"]),
    (
        "Databases",
        &["SQL", "Data Modeling", "Query Optimization", "NoSQL"],
    ),
    (
        "Algorithms",
        &["Data Structures", "Sorting", "Searching", "Complexity"],
    ),
    ("DevOps", &["Git", "Docker", "CI/CD", "Deployment"]),
];

pub fn skills_for_category(category: &str) -> Option<&'static [&'static str]> {
    CATEGORY_SKILLS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, skills)| *skills)
}

/// Position-decayed share of a test score credited to the skill at `idx`.
pub fn contribution(score: u8, idx: usize) -> f64 {
    let score = score as f64;
    let idx = idx as f64;
    (score - idx * 5.0).max(score * (1.0 - idx * 0.1))
}

/// Folds a scored attempt into the user's skill list. Results in a category
/// with no skill table leave the list untouched.
pub fn apply_result(mut skills: Vec<Skill>, result: &TestResult) -> Vec<Skill> {
    let Some(names) = skills_for_category(&result.category) else {
        warn!(
            "No skill table for category '{}', skipping skill update",
            result.category
        );
        return skills;
    };

    let weights = BlendWeights::default();
    for (idx, name) in names.iter().enumerate() {
        let incoming = contribution(result.score, idx);
        match skills
            .iter_mut()
            .find(|s| s.name == *name && s.category == result.category)
        {
            Some(existing) => existing.score = blend(Some(existing.score), incoming, &weights),
            None => skills.push(Skill::new(
                *name,
                result.category.as_str(),
                blend(None, incoming, &weights),
            )),
        }
    }

    debug!(
        "Applied {} result ({}) to {} skills",
        result.category,
        result.score,
        names.len()
    );
    skills
}
