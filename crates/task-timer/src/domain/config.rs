//! Configuration domain facade.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::entities::{Config, ConfigKey, KeyFallback};
use crate::errors::TimerResult;
use crate::storage::atomic_write;

/// Loads, validates and persists the user's settings
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// A manager for `config_path` holding built-in defaults. Nothing is read.
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            config: Config::default(),
        }
    }

    /// Read the persisted configuration.
    ///
    /// Never fails. A missing file means defaults; anything unreadable falls
    /// back key by key, and each fallback is logged and returned.
    pub async fn load(config_path: impl AsRef<Path>) -> (Self, Vec<KeyFallback>) {
        let mut manager = Self::new(config_path);
        let fallbacks = manager.reload().await;
        (manager, fallbacks)
    }

    async fn reload(&mut self) -> Vec<KeyFallback> {
        let path = self.config_path.display().to_string();

        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path, "No config file, using defaults");
                self.config = Config::default();
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Could not read config file, using defaults");
                self.config = Config::default();
                return all_keys(&format!("could not read {path}: {e}"));
            }
        };

        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path, error = %e, "Config file is not valid JSON, using defaults");
                self.config = Config::default();
                return all_keys(&format!("{path} is not valid JSON: {e}"));
            }
        };

        let (config, fallbacks) = Config::from_value(&value);
        for fallback in &fallbacks {
            warn!(
                key = %fallback.key,
                reason = %fallback.reason,
                "Config key fell back to its default"
            );
        }
        self.config = config;
        fallbacks
    }

    /// Location of the persisted configuration
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read-only snapshot of the current settings
    pub fn show(&self) -> &Config {
        &self.config
    }

    pub fn get(&self, key: ConfigKey) -> String {
        self.config.get(key)
    }

    /// Validate and persist one setting. On error neither memory nor disk
    /// changes.
    pub async fn set(&mut self, key: ConfigKey, value: &str) -> TimerResult<()> {
        let mut updated = self.config.clone();
        updated.apply(key, value)?;
        self.save(&updated)?;
        self.config = updated;

        info!(key = %key, value = %self.config.get(key), "Config updated");
        Ok(())
    }

    /// Overwrite the persisted configuration with built-in defaults.
    pub async fn reset(&mut self) -> TimerResult<()> {
        let defaults = Config::default();
        self.save(&defaults)?;
        self.config = defaults;

        info!(path = %self.config_path.display(), "Config reset to defaults");
        Ok(())
    }

    /// Write the current settings only if no config file exists yet.
    pub async fn init(&self) -> TimerResult<bool> {
        if fs::try_exists(&self.config_path).await? {
            debug!(path = %self.config_path.display(), "Config file already exists");
            return Ok(false);
        }
        self.save(&self.config)?;
        info!(path = %self.config_path.display(), "Config file created");
        Ok(true)
    }

    fn save(&self, config: &Config) -> TimerResult<()> {
        let content = serde_json::to_string_pretty(config)?;
        atomic_write(&self.config_path, content.as_bytes())
    }
}

fn all_keys(reason: &str) -> Vec<KeyFallback> {
    ConfigKey::ALL
        .into_iter()
        .map(|key| KeyFallback {
            key,
            reason: reason.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, TimerError};
    use tempfile::TempDir;

    fn config_path(temp: &TempDir) -> PathBuf {
        temp.path().join(".task_timer").join("config.json")
    }

    #[tokio::test]
    async fn test_missing_file_is_defaults() {
        let temp = TempDir::new().unwrap();
        let (manager, fallbacks) = ConfigManager::load(config_path(&temp)).await;

        assert!(fallbacks.is_empty());
        assert_eq!(manager.show(), &Config::default());
        assert!(!manager.path().exists());
    }

    #[tokio::test]
    async fn test_set_persists_and_show_reflects() {
        let temp = TempDir::new().unwrap();
        let (mut manager, _) = ConfigManager::load(config_path(&temp)).await;

        manager.set(ConfigKey::SoundEnabled, "false").await.unwrap();
        assert!(!manager.show().sound_enabled);
        assert_eq!(manager.get(ConfigKey::SoundEnabled), "false");

        let (reloaded, fallbacks) = ConfigManager::load(config_path(&temp)).await;
        assert!(fallbacks.is_empty());
        assert!(!reloaded.show().sound_enabled);
    }

    #[tokio::test]
    async fn test_invalid_value_leaves_config_unchanged() {
        let temp = TempDir::new().unwrap();
        let (mut manager, _) = ConfigManager::load(config_path(&temp)).await;
        manager.set(ConfigKey::SoundEnabled, "false").await.unwrap();
        let on_disk = std::fs::read_to_string(manager.path()).unwrap();

        let err = manager.set(ConfigKey::SoundEnabled, "maybe").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!manager.show().sound_enabled);
        assert_eq!(std::fs::read_to_string(manager.path()).unwrap(), on_disk);

        let err = manager.set(ConfigKey::DefaultBreak, "90").await.unwrap_err();
        assert!(matches!(err, TimerError::InvalidConfigValue { .. }));
        assert_eq!(manager.show().default_break, 5);
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "default_duration = 30").unwrap();

        let (manager, fallbacks) = ConfigManager::load(&path).await;
        assert_eq!(fallbacks.len(), ConfigKey::ALL.len());
        assert_eq!(manager.show(), &Config::default());
    }

    #[tokio::test]
    async fn test_invalid_key_falls_back_alone() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"default_duration": 0, "default_break": 10, "sound_enabled": "off",
                "data_file": "/tmp/tasks.json", "sound_file": "/tmp/ding.wav"}"#,
        )
        .unwrap();

        let (manager, fallbacks) = ConfigManager::load(&path).await;
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].key, ConfigKey::DefaultDuration);

        let config = manager.show();
        assert_eq!(config.default_duration, 25);
        assert_eq!(config.default_break, 10);
        assert!(!config.sound_enabled);
        assert_eq!(config.data_file, PathBuf::from("/tmp/tasks.json"));
    }

    #[tokio::test]
    async fn test_reset_and_init() {
        let temp = TempDir::new().unwrap();
        let (mut manager, _) = ConfigManager::load(config_path(&temp)).await;

        assert!(manager.init().await.unwrap());
        assert!(!manager.init().await.unwrap());

        manager.set(ConfigKey::DefaultDuration, "50").await.unwrap();
        manager.reset().await.unwrap();
        assert_eq!(manager.show().default_duration, 25);

        let (reloaded, _) = ConfigManager::load(config_path(&temp)).await;
        assert_eq!(reloaded.show(), &Config::default());
    }
}
