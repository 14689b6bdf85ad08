//! Error types for the task-timer crate.

use thiserror::Error;

/// Broad class of a [`TimerError`], used for reporting and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Storage,
    Notifier,
}

/// Error types for task and timer management
#[derive(Error, Debug, Clone)]
pub enum TimerError {
    // Task errors
    #[error("Task {id} not found")]
    TaskNotFound { id: u64 },

    #[error("Task {id} is already completed")]
    AlreadyCompleted { id: u64 },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Configuration errors
    #[error("Unknown configuration key '{key}' (expected one of: {expected})")]
    UnknownConfigKey { key: String, expected: String },

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidConfigValue { key: String, reason: String },

    // Storage errors
    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    #[error("Failed to read file '{path}': {reason}")]
    FileReadError { path: String, reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    FileWriteError { path: String, reason: String },

    #[error("Failed to parse JSON: {reason}")]
    JsonParseError { reason: String },

    // Notification errors
    #[error("Notification failed: {reason}")]
    Notifier { reason: String },
}

impl TimerError {
    /// Map this error onto the taxonomy callers reason about.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskNotFound { .. } | Self::UnknownConfigKey { .. } => ErrorKind::NotFound,
            Self::InvalidArgument { .. } | Self::InvalidConfigValue { .. } => {
                ErrorKind::Validation
            }
            Self::AlreadyCompleted { .. } => ErrorKind::Conflict,
            Self::StorageError { .. }
            | Self::FileReadError { .. }
            | Self::FileWriteError { .. }
            | Self::JsonParseError { .. } => ErrorKind::Storage,
            Self::Notifier { .. } => ErrorKind::Notifier,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for TimerError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TimerError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError {
            reason: err.to_string(),
        }
    }
}

impl From<notify::NotifyError> for TimerError {
    fn from(err: notify::NotifyError) -> Self {
        Self::Notifier {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for task-timer operations
pub type TimerResult<T> = Result<T, TimerError>;
