use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::scoring::{mean, round_score};
use crate::models::skill::Skill;
use crate::models::test::TestResult;

use super::performance::CategoryPerformance;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    All,
    Month,
    Week,
}

impl TimeRange {
    /// Earliest `taken_at` still inside the range.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::All => None,
            TimeRange::Month => Some(now - Duration::days(30)),
            TimeRange::Week => Some(now - Duration::days(7)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: u8,
}

impl CategoryScore {
    fn none() -> Self {
        Self {
            name: "N/A".to_string(),
            score: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub range: &'static str,
    pub total_tests: usize,
    pub avg_score: u8,
    pub best_category: CategoryScore,
    pub worst_category: CategoryScore,
    /// Newest minus oldest score within the range.
    pub improvement: i16,
    pub skills_distribution: Vec<SkillCount>,
}

fn best_category(performance: &[CategoryPerformance]) -> CategoryScore {
    let mut best = CategoryScore::none();
    for c in performance {
        if c.score > best.score {
            best = CategoryScore {
                name: c.title.clone(),
                score: c.score,
            };
        }
    }
    best
}

/// Lowest scoring category that has any data. A category at 100 never counts
/// as the weakest.
fn worst_category(performance: &[CategoryPerformance]) -> CategoryScore {
    performance
        .iter()
        .filter(|c| c.score > 0 && c.score < 100)
        .fold(None::<&CategoryPerformance>, |worst, c| match worst {
            Some(w) if w.score <= c.score => Some(w),
            _ => Some(c),
        })
        .map(|c| CategoryScore {
            name: c.title.clone(),
            score: c.score,
        })
        .unwrap_or_else(CategoryScore::none)
}

fn skills_distribution(skills: &[Skill]) -> Vec<SkillCount> {
    let mut out: Vec<SkillCount> = Vec::new();
    for s in skills {
        match out.iter_mut().find(|c| c.category == s.category) {
            Some(entry) => entry.count += 1,
            None => out.push(SkillCount {
                category: s.category.clone(),
                count: 1,
            }),
        }
    }
    out
}

pub fn summarize(
    results: &[TestResult],
    performance: &[CategoryPerformance],
    skills: &[Skill],
    range: TimeRange,
    now: DateTime<Utc>,
) -> StatisticsSummary {
    let cutoff = range.since(now);
    let mut in_range: Vec<&TestResult> = results
        .iter()
        .filter(|r| cutoff.map_or(true, |c| r.taken_at >= c))
        .collect();
    in_range.sort_by_key(|r| r.taken_at);

    let improvement = match (in_range.first(), in_range.last()) {
        (Some(oldest), Some(newest)) if in_range.len() >= 2 => {
            newest.score as i16 - oldest.score as i16
        }
        _ => 0,
    };

    StatisticsSummary {
        range: match range {
            TimeRange::All => "all",
            TimeRange::Month => "month",
            TimeRange::Week => "week",
        },
        total_tests: in_range.len(),
        avg_score: mean(in_range.iter().map(|r| r.score))
            .map(round_score)
            .unwrap_or(0),
        best_category: best_category(performance),
        worst_category: worst_category(performance),
        improvement,
        skills_distribution: skills_distribution(skills),
    }
}
