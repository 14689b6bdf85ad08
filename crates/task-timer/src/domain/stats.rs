//! Completion and time statistics, grouped by tag.
//!
//! Everything here is a pure function of a task snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::Task;

/// Counters for a single tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagBucket {
    pub total: usize,
    pub completed: usize,
    pub completed_pct: u32,
    pub time_spent: u64,
}

/// Statistics over a set of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    /// Tag the counters were restricted to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_tag: Option<String>,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completed_pct: u32,
    pub total_time_spent: u64,
    /// Only present when no filter was given. Buckets overlap: a task with
    /// several tags counts once in each.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_tag: Option<BTreeMap<String, TagBucket>>,
}

/// `round(completed / total * 100)`, or 0 for an empty bucket.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn completion_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Build a report over `tasks`, optionally restricted to `filter_tag`.
pub fn compute(tasks: &[Task], filter_tag: Option<&str>) -> StatsReport {
    let filter = filter_tag.map(|t| t.trim().to_lowercase());
    let selected: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.as_deref().map_or(true, |f| t.tags.contains(f)))
        .collect();

    let total = selected.len();
    let completed = selected.iter().filter(|t| t.is_completed()).count();
    let total_time_spent = selected
        .iter()
        .map(|t| u64::from(t.time_spent_minutes))
        .sum();

    let per_tag = filter.is_none().then(|| {
        let mut buckets: BTreeMap<String, TagBucket> = BTreeMap::new();
        for task in &selected {
            for tag in &task.tags {
                let bucket = buckets.entry(tag.clone()).or_default();
                bucket.total += 1;
                if task.is_completed() {
                    bucket.completed += 1;
                }
                bucket.time_spent += u64::from(task.time_spent_minutes);
            }
        }
        for bucket in buckets.values_mut() {
            bucket.completed_pct = completion_percent(bucket.completed, bucket.total);
        }
        buckets
    });

    StatsReport {
        filter_tag: filter,
        total,
        completed,
        pending: total - completed,
        completed_pct: completion_percent(completed, total),
        total_time_spent,
        per_tag,
    }
}
