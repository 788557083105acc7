use std::cmp::Ordering;

use crate::models::recommendation::Recommendation;
use crate::models::test::TestResult;
use crate::models::user::User;

use super::keywords::{career_keywords, specialization_keywords};

/// Items returned when every stage came up empty.
const FALLBACK_COUNT: usize = 3;

/// How many of the lowest-scoring categories get boosted.
const WEAK_CATEGORY_COUNT: usize = 2;

/// Keeps `stage` if it produced something, otherwise the list it narrowed.
pub fn narrow<T>(current: Vec<T>, stage: Option<Vec<T>>) -> Vec<T> {
    match stage {
        Some(next) if !next.is_empty() => next,
        _ => current,
    }
}

/// Case-insensitive substring match over title, description and category.
pub fn matches_any(rec: &Recommendation, keywords: &[&str]) -> bool {
    let haystacks = [
        rec.title.to_lowercase(),
        rec.description.to_lowercase(),
        rec.category.to_lowercase(),
    ];
    keywords.iter().any(|kw| {
        let kw = kw.to_lowercase();
        haystacks.iter().any(|h| h.contains(&kw))
    })
}

fn filter_by(items: &[Recommendation], keywords: &[&str]) -> Vec<Recommendation> {
    items
        .iter()
        .filter(|r| matches_any(r, keywords))
        .cloned()
        .collect()
}

fn career_stage(user: &User, items: &[Recommendation]) -> Option<Vec<Recommendation>> {
    if user.career.trim().is_empty() {
        return None;
    }
    Some(filter_by(items, career_keywords(&user.career)))
}

fn specialization_stage(user: &User, items: &[Recommendation]) -> Option<Vec<Recommendation>> {
    let keywords = specialization_keywords(&user.specialization);
    if keywords.is_empty() {
        return None;
    }
    Some(filter_by(items, keywords))
}

/// Lowercased names of the `n` categories with the lowest mean score. Ties
/// keep the order in which categories first appear in `results`.
pub fn weakest_categories(results: &[TestResult], n: usize) -> Vec<String> {
    let mut totals: Vec<(String, u32, u32)> = Vec::new();
    for r in results {
        match totals.iter_mut().find(|(c, _, _)| *c == r.category) {
            Some((_, sum, count)) => {
                *sum += r.score as u32;
                *count += 1;
            }
            None => totals.push((r.category.clone(), r.score as u32, 1)),
        }
    }

    let mut means: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(c, sum, count)| (c, sum as f64 / count as f64))
        .collect();
    means.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    means
        .into_iter()
        .take(n)
        .map(|(c, _)| c.to_lowercase())
        .collect()
}

fn weak_area_stage(
    items: &[Recommendation],
    results: &[TestResult],
) -> Option<Vec<Recommendation>> {
    let weak = weakest_categories(results, WEAK_CATEGORY_COUNT);
    if weak.is_empty() {
        return None;
    }

    let (boosted, rest): (Vec<_>, Vec<_>) = items.iter().cloned().partition(|r| {
        let category = r.category.to_lowercase();
        weak.iter().any(|w| category.contains(w.as_str()))
    });
    if boosted.is_empty() {
        return None;
    }

    Some(boosted.into_iter().chain(rest).collect())
}

/// Ranks the catalog for a user: career filter, specialization filter, then
/// weak categories first. A stage that would empty the list is skipped. The
/// result is never empty for a non-empty catalog; callers take a prefix.
pub fn select(
    user: &User,
    catalog: &[Recommendation],
    results: &[TestResult],
) -> Vec<Recommendation> {
    let list = catalog.to_vec();

    let stage = career_stage(user, &list);
    let list = narrow(list, stage);

    let stage = specialization_stage(user, &list);
    let list = narrow(list, stage);

    let stage = weak_area_stage(&list, results);
    let list = narrow(list, stage);

    if list.is_empty() {
        return catalog.iter().take(FALLBACK_COUNT).cloned().collect();
    }
    list
}
