//! Configuration entities.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use super::task::MAX_DURATION_MINUTES;
use crate::errors::{TimerError, TimerResult};

/// Longest break a user may configure.
pub const MAX_BREAK_MINUTES: u32 = 60;

const fn default_duration() -> u32 {
    25
}

const fn default_break() -> u32 {
    5
}

const fn default_sound_enabled() -> bool {
    true
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_file() -> PathBuf {
    home().join(".task_timer_data.json")
}

fn default_sound_file() -> PathBuf {
    home().join(".task_timer").join("notification.wav")
}

/// Default location of the persisted configuration.
pub fn default_config_path() -> PathBuf {
    home().join(".task_timer").join("config.json")
}

/// The recognized configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    DefaultDuration,
    DefaultBreak,
    SoundEnabled,
    DataFile,
    SoundFile,
}

impl ConfigKey {
    pub const ALL: [Self; 5] = [
        Self::DefaultDuration,
        Self::DefaultBreak,
        Self::SoundEnabled,
        Self::DataFile,
        Self::SoundFile,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DefaultDuration => "default_duration",
            Self::DefaultBreak => "default_break",
            Self::SoundEnabled => "sound_enabled",
            Self::DataFile => "data_file",
            Self::SoundFile => "sound_file",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfigKey {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| TimerError::UnknownConfigKey {
                key: s.to_string(),
                expected: Self::expected(),
            })
    }
}

/// Persisted configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Countdown length used by `add` when no duration is given
    pub default_duration: u32,

    /// Break length used by `start --break` without minutes
    pub default_break: u32,

    pub sound_enabled: bool,

    /// Location of the task collection
    pub data_file: PathBuf,

    /// Cue played on completion
    pub sound_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            default_break: default_break(),
            sound_enabled: default_sound_enabled(),
            data_file: default_data_file(),
            sound_file: default_sound_file(),
        }
    }
}

/// A key that could not be read from the persisted config and fell back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFallback {
    pub key: ConfigKey,
    pub reason: String,
}

impl Config {
    /// Build a config from a parsed JSON document, one key at a time.
    ///
    /// Missing or invalid keys keep their built-in default and are reported
    /// back as [`KeyFallback`]s. Unrecognized keys are ignored.
    pub fn from_value(value: &Value) -> (Self, Vec<KeyFallback>) {
        let mut config = Self::default();
        let mut fallbacks = Vec::new();

        let Some(obj) = value.as_object() else {
            fallbacks.extend(ConfigKey::ALL.into_iter().map(|key| KeyFallback {
                key,
                reason: "configuration is not a JSON object".to_string(),
            }));
            return (config, fallbacks);
        };

        for key in ConfigKey::ALL {
            let Some(raw) = obj.get(key.as_str()) else {
                fallbacks.push(KeyFallback {
                    key,
                    reason: "missing".to_string(),
                });
                continue;
            };

            let raw = match raw {
                Value::String(s) => s.clone(),
                Value::Number(_) | Value::Bool(_) => raw.to_string(),
                _ => {
                    fallbacks.push(KeyFallback {
                        key,
                        reason: format!("unsupported value {raw}"),
                    });
                    continue;
                }
            };

            if let Err(e) = config.apply(key, &raw) {
                fallbacks.push(KeyFallback {
                    key,
                    reason: e.to_string(),
                });
            }
        }

        (config, fallbacks)
    }

    /// Validate `raw` for `key` and store it. On error nothing changes.
    pub fn apply(&mut self, key: ConfigKey, raw: &str) -> TimerResult<()> {
        match key {
            ConfigKey::DefaultDuration => {
                self.default_duration = parse_minutes(key, raw, MAX_DURATION_MINUTES)?;
            }
            ConfigKey::DefaultBreak => {
                self.default_break = parse_minutes(key, raw, MAX_BREAK_MINUTES)?;
            }
            ConfigKey::SoundEnabled => self.sound_enabled = parse_bool(key, raw)?,
            ConfigKey::DataFile => self.data_file = parse_path(key, raw)?,
            ConfigKey::SoundFile => self.sound_file = parse_path(key, raw)?,
        }
        Ok(())
    }

    /// Current value of `key`, rendered as a string.
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::DefaultDuration => self.default_duration.to_string(),
            ConfigKey::DefaultBreak => self.default_break.to_string(),
            ConfigKey::SoundEnabled => self.sound_enabled.to_string(),
            ConfigKey::DataFile => self.data_file.display().to_string(),
            ConfigKey::SoundFile => self.sound_file.display().to_string(),
        }
    }
}

fn parse_minutes(key: ConfigKey, raw: &str, max: u32) -> TimerResult<u32> {
    let invalid = |reason: String| TimerError::InvalidConfigValue {
        key: key.to_string(),
        reason,
    };

    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{raw}' is not a whole number")))?;

    if value == 0 || value > max {
        return Err(invalid(format!("{value} is outside 1-{max}")));
    }
    Ok(value)
}

fn parse_bool(key: ConfigKey, raw: &str) -> TimerResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(TimerError::InvalidConfigValue {
            key: key.to_string(),
            reason: format!("'{raw}' is not a boolean (use true or false)"),
        }),
    }
}

fn parse_path(key: ConfigKey, raw: &str) -> TimerResult<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimerError::InvalidConfigValue {
            key: key.to_string(),
            reason: "path must not be empty".to_string(),
        });
    }
    Ok(expand_home(trimmed))
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home().join(rest),
        None if path == "~" => home(),
        None => PathBuf::from(path),
    }
}

/// Per-invocation overrides, highest precedence.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub default_duration: Option<u32>,
    pub default_break: Option<u32>,
    pub sound_enabled: Option<bool>,
    pub data_file: Option<PathBuf>,
    pub sound_file: Option<PathBuf>,
}

/// The settings in force for one invocation.
///
/// Resolved once from overrides, persisted config and built-in defaults, then
/// passed by reference to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    default_duration: u32,
    default_break: u32,
    sound_enabled: bool,
    data_file: PathBuf,
    sound_file: PathBuf,
}

impl EffectiveConfig {
    /// Merge `overrides` over `persisted`.
    pub fn resolve(persisted: &Config, overrides: &Overrides) -> Self {
        Self {
            default_duration: overrides
                .default_duration
                .unwrap_or(persisted.default_duration),
            default_break: overrides.default_break.unwrap_or(persisted.default_break),
            sound_enabled: overrides.sound_enabled.unwrap_or(persisted.sound_enabled),
            data_file: overrides
                .data_file
                .clone()
                .unwrap_or_else(|| persisted.data_file.clone()),
            sound_file: overrides
                .sound_file
                .clone()
                .unwrap_or_else(|| persisted.sound_file.clone()),
        }
    }

    pub fn default_duration(&self) -> u32 {
        self.default_duration
    }

    pub fn default_break(&self) -> u32 {
        self.default_break
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn sound_file(&self) -> &Path {
        &self.sound_file
    }
}

impl From<&Config> for EffectiveConfig {
    fn from(config: &Config) -> Self {
        Self::resolve(config, &Overrides::default())
    }
}
