//! Core data structures for task tracking.

mod config;
mod task;

pub use config::{
    default_config_path, expand_home, Config, ConfigKey, EffectiveConfig, KeyFallback, Overrides,
    MAX_BREAK_MINUTES,
};
pub use task::{
    normalize_tag, normalize_tags, validate_duration, validate_name, Task, TaskStatus,
    MAX_DURATION_MINUTES,
};
