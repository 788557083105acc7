use tracing::info;

use crate::models::skill::Skill;
use crate::models::test::TestResult;
use crate::models::user::{Level, User};

use super::scoring::mean;

struct Threshold {
    level: Level,
    min_tests: usize,
    min_test_mean: f64,
    min_skill_mean: f64,
}

/// Checked in order; the first match wins.
const THRESHOLDS: &[Threshold] = &[
    Threshold {
        level: Level::Advanced,
        min_tests: 5,
        min_test_mean: 70.0,
        min_skill_mean: 70.0,
    },
    Threshold {
        level: Level::Intermediate,
        min_tests: 3,
        min_test_mean: 50.0,
        min_skill_mean: 50.0,
    },
];

/// `None` when either input is empty; there is nothing to classify on.
pub fn classify(results: &[TestResult], skills: &[Skill]) -> Option<Level> {
    let test_mean = mean(results.iter().map(|r| r.score))?;
    let skill_mean = mean(skills.iter().map(|s| s.score))?;

    let level = THRESHOLDS
        .iter()
        .find(|t| {
            results.len() >= t.min_tests
                && test_mean >= t.min_test_mean
                && skill_mean >= t.min_skill_mean
        })
        .map(|t| t.level)
        .unwrap_or(Level::Beginner);

    Some(level)
}

/// Sets the classified level on the user, logging a change.
pub fn assign(mut user: User, level: Level) -> User {
    if user.level != level {
        info!(
            "User {} level {} -> {}",
            user.id,
            user.level.as_str(),
            level.as_str()
        );
    }
    user.level = level;
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn results(scores: &[u8]) -> Vec<TestResult> {
        scores
            .iter()
            .map(|&score| TestResult {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                test_id: "1".to_string(),
                test_title: "t".to_string(),
                category: "Frontend".to_string(),
                score,
                answers: Default::default(),
                taken_at: Utc::now(),
            })
            .collect()
    }

    fn skills(scores: &[u8]) -> Vec<Skill> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Skill::new(format!("s{i}"), "Frontend", score))
            .collect()
    }

    #[test]
    fn test_empty_inputs_do_not_classify() {
        assert_eq!(classify(&[], &skills(&[90])), None);
        assert_eq!(classify(&results(&[90]), &[]), None);
    }

    #[test]
    fn test_advanced() {
        assert_eq!(
            classify(&results(&[70, 80, 90, 70, 70]), &skills(&[70, 75])),
            Some(Level::Advanced)
        );
    }

    #[test]
    fn test_advanced_needs_five_tests() {
        assert_eq!(
            classify(&results(&[90, 90, 90, 90]), &skills(&[90])),
            Some(Level::Intermediate)
        );
    }

    #[test]
    fn test_two_tests_stay_beginner() {
        // Averages clear the Intermediate bar but the count does not.
        assert_eq!(
            classify(&results(&[50, 60]), &skills(&[60])),
            Some(Level::Beginner)
        );
    }

    #[test]
    fn test_three_tests_reach_intermediate() {
        assert_eq!(
            classify(&results(&[50, 55, 60]), &skills(&[60])),
            Some(Level::Intermediate)
        );
    }

    #[test]
    fn test_level_is_monotonic_in_scores() {
        let rank = |l: Level| match l {
            Level::Beginner => 0,
            Level::Intermediate => 1,
            Level::Advanced => 2,
        };
        for count in 1..=6 {
            let mut last = 0;
            for score in (0..=100u8).step_by(5) {
                let level = classify(&results(&vec![score; count]), &skills(&[score])).unwrap();
                assert!(rank(level) >= last, "count {count}, score {score}");
                last = rank(level);
            }
        }
    }

    #[test]
    fn test_assign_replaces_level() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@x.io".to_string(),
            student_id: String::new(),
            career: String::new(),
            semester: String::new(),
            specialization: String::new(),
            bio: String::new(),
            level: Level::Beginner,
            created_at: Utc::now(),
        };
        let promoted = assign(user.clone(), Level::Intermediate);
        assert_eq!(promoted.level, Level::Intermediate);
        assert_eq!(promoted.id, user.id);
        assert_eq!(assign(promoted, Level::Intermediate).level, Level::Intermediate);
    }
}
