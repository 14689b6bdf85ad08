#![warn(clippy::pedantic)]
// Allow common pedantic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

//! # Task Timer
//!
//! A local, single-user Pomodoro tool: register tasks with a target duration
//! and tags, count down against them, then query time and completion stats.
//!
//! This crate provides:
//! - A task store persisted to one JSON file with atomic replacement
//! - A cancellable countdown with an optional break
//! - Tag-grouped statistics and CSV/JSON export
//! - Layered configuration (flags over persisted file over defaults)
//!
//! ## Example
//!
//! ```rust,ignore
//! use task_timer::{ConfigManager, EffectiveConfig, TaskStore};
//!
//! let (config, _) = ConfigManager::load(task_timer::default_config_path()).await;
//! let effective = EffectiveConfig::from(config.show());
//! let (mut store, _) = TaskStore::open_file(&effective).await;
//! let task = store.add("Write report", 25, ["work"]).await?;
//! ```

// Core entities
pub mod entities;

// Error types
pub mod errors;

// Storage layer
pub mod storage;

// Domain facades
pub mod domain;

// Terminal UI helpers
pub mod ui;

// Re-export key types for convenience
pub use domain::{
    BreakOutcome, ConfigManager, ExportFormat, LoadWarning, Phase, ProgressSink, StartOptions,
    StatsReport, TagBucket, TaskStore, TaskTimer, Tick, TimerOutcome, TimerState,
};
pub use entities::{
    default_config_path, Config, ConfigKey, EffectiveConfig, KeyFallback, Overrides, Task,
    TaskStatus,
};
pub use errors::{ErrorKind, TimerError, TimerResult};
pub use storage::{FileStorage, Storage};
