//! Task entity and related types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{TimerError, TimerResult};

/// Upper bound for any duration given in minutes.
pub const MAX_DURATION_MINUTES: u32 = 999;

/// Task status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(TimerError::invalid(format!("unknown status '{s}'"))),
        }
    }
}

/// A unit of tracked work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique, monotonically assigned identifier
    pub id: u64,

    /// Human readable name
    pub name: String,

    /// Target countdown length
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,

    /// Normalized (lowercase) tag set
    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Minutes credited at completion, zero while pending
    #[serde(default, rename = "timeSpentMinutes")]
    pub time_spent_minutes: u32,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "completedAt"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task, validating every field.
    pub fn new<I, S>(id: u64, name: &str, duration_minutes: u32, tags: I) -> TimerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            id,
            name: validate_name(name)?,
            duration_minutes: validate_duration(duration_minutes)?,
            tags: normalize_tags(tags)?,
            status: TaskStatus::Pending,
            time_spent_minutes: 0,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Case-insensitive exact tag match
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.trim().to_lowercase())
    }

    /// Transition Pending -> Completed, recording the time spent.
    ///
    /// Fails with [`TimerError::AlreadyCompleted`] on a second attempt; the
    /// recorded time is never overwritten.
    pub fn mark_complete(&mut self, actual_minutes: u32) -> TimerResult<()> {
        if self.is_completed() {
            return Err(TimerError::AlreadyCompleted { id: self.id });
        }

        self.status = TaskStatus::Completed;
        self.time_spent_minutes = actual_minutes;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

/// Trim a task name and reject it if nothing is left.
pub fn validate_name(name: &str) -> TimerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TimerError::invalid("task name must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Durations are whole minutes in `1..=MAX_DURATION_MINUTES`.
pub fn validate_duration(minutes: u32) -> TimerResult<u32> {
    if minutes == 0 || minutes > MAX_DURATION_MINUTES {
        return Err(TimerError::invalid(format!(
            "duration must be between 1 and {MAX_DURATION_MINUTES} minutes, got {minutes}"
        )));
    }
    Ok(minutes)
}

/// Normalize a single tag: trimmed, lowercase, no whitespace or commas.
pub fn normalize_tag(tag: &str) -> TimerResult<String> {
    let normalized = tag.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(TimerError::invalid("tags must not be empty"));
    }
    if normalized.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(TimerError::invalid(format!(
            "tag '{}' must not contain whitespace or commas",
            tag.trim()
        )));
    }
    Ok(normalized)
}

/// Normalize a collection of tags into a set; duplicates collapse.
pub fn normalize_tags<I, S>(tags: I) -> TimerResult<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| normalize_tag(t.as_ref()))
        .collect()
}
