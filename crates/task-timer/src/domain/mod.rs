//! Domain facades for task timing.
//!
//! These combine the storage layer with the rules of the Pomodoro workflow:
//! the task lifecycle, the countdown, statistics and export.

mod config;
pub mod export;
pub mod stats;
mod store;
mod timer;

pub use config::ConfigManager;
pub use export::ExportFormat;
pub use stats::{StatsReport, TagBucket};
pub use store::{LoadWarning, TaskStore};
pub use timer::{
    BreakOutcome, Phase, ProgressSink, StartOptions, TaskTimer, Tick, TimerOutcome, TimerState,
    DEFAULT_TICK, NOTIFY_TIMEOUT,
};
