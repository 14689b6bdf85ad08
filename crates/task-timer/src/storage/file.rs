//! File-based storage implementation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use super::atomic::atomic_write;
use super::traits::Storage;
use crate::entities::{normalize_tags, validate_duration, Task};
use crate::errors::{TimerError, TimerResult};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Data file layout: `{ "version": 1, "tasks": [...] }`.
#[derive(Debug, Serialize)]
struct TasksDocumentRef<'a> {
    version: u32,
    tasks: &'a [Task],
}

/// Accepted on load. A bare array is what early versions wrote.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TasksDocument {
    Versioned {
        #[serde(default)]
        #[allow(dead_code)]
        version: u32,
        tasks: Vec<Task>,
    },
    Bare(Vec<Task>),
}

impl TasksDocument {
    fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Versioned { tasks, .. } | Self::Bare(tasks) => tasks,
        }
    }
}

/// JSON file storage with atomic replacement
pub struct FileStorage {
    /// Path to the data file
    tasks_file: PathBuf,
}

impl FileStorage {
    /// Create a new file storage instance backed by `tasks_file`.
    pub fn new(tasks_file: impl AsRef<Path>) -> Self {
        Self {
            tasks_file: tasks_file.as_ref().to_path_buf(),
        }
    }

    /// Get the data file path
    pub fn tasks_file(&self) -> &Path {
        &self.tasks_file
    }

    /// Pick a backup name next to the data file that does not exist yet.
    fn quarantine_path(&self) -> PathBuf {
        let file_name = self
            .tasks_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("tasks.json");
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");

        let mut candidate = self
            .tasks_file
            .with_file_name(format!("{file_name}.corrupt-{stamp}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self
                .tasks_file
                .with_file_name(format!("{file_name}.corrupt-{stamp}-{n}"));
            n += 1;
        }
        candidate
    }
}

/// Reject documents that parse but break collection invariants, and bring
/// hand-edited tags back to their canonical lowercase form.
fn check_invariants(tasks: &mut [Task]) -> TimerResult<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks.iter_mut() {
        if task.id == 0 {
            return Err(TimerError::StorageError {
                reason: format!("task '{}' has id 0", task.name),
            });
        }
        if !seen.insert(task.id) {
            return Err(TimerError::StorageError {
                reason: format!("duplicate task id {}", task.id),
            });
        }
        validate_duration(task.duration_minutes).map_err(|e| TimerError::StorageError {
            reason: format!("task {}: {e}", task.id),
        })?;
        task.tags = normalize_tags(&task.tags).map_err(|e| TimerError::StorageError {
            reason: format!("task {}: {e}", task.id),
        })?;
    }
    Ok(())
}

#[async_trait]
impl Storage for FileStorage {
    fn storage_type(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> String {
        self.tasks_file.display().to_string()
    }

    async fn load_tasks(&self) -> TimerResult<Option<Vec<Task>>> {
        // Bytes, not a string: invalid UTF-8 is corrupt content, not a read failure.
        let content = match fs::read(&self.tasks_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.tasks_file.display(), "No data file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(TimerError::FileReadError {
                    path: self.location(),
                    reason: e.to_string(),
                })
            }
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Some(Vec::new()));
        }

        let mut tasks = serde_json::from_slice::<TasksDocument>(&content)?.into_tasks();
        check_invariants(&mut tasks)?;

        debug!(path = %self.tasks_file.display(), count = tasks.len(), "Loaded tasks");
        Ok(Some(tasks))
    }

    async fn save_tasks(&self, tasks: &[Task]) -> TimerResult<()> {
        let document = TasksDocumentRef {
            version: FORMAT_VERSION,
            tasks,
        };
        let content = serde_json::to_string_pretty(&document)?;
        atomic_write(&self.tasks_file, content.as_bytes())?;

        debug!(path = %self.tasks_file.display(), count = tasks.len(), "Saved tasks");
        Ok(())
    }

    async fn quarantine(&self) -> TimerResult<String> {
        let backup = self.quarantine_path();
        fs::rename(&self.tasks_file, &backup)
            .await
            .map_err(|e| TimerError::FileWriteError {
                path: backup.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(backup.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("tasks.json"));
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let (_temp_dir, storage) = setup_storage();
        assert!(storage.load_tasks().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_save_tasks() {
        let (_temp_dir, storage) = setup_storage();

        let mut done = Task::new(2, "Review", 15, ["work"]).unwrap();
        done.mark_complete(15).unwrap();
        let tasks = vec![Task::new(1, "Write", 25, ["work", "Writing"]).unwrap(), done];

        storage.save_tasks(&tasks).await.unwrap();
        let loaded = storage.load_tasks().await.unwrap().unwrap();
        assert_eq!(loaded, tasks);
    }

    #[tokio::test]
    async fn test_on_disk_format() {
        let (_temp_dir, storage) = setup_storage();
        let tasks = vec![Task::new(1, "Write", 25, ["work"]).unwrap()];
        storage.save_tasks(&tasks).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.tasks_file()).unwrap())
                .unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["tasks"][0]["durationMinutes"], 25);
        assert_eq!(raw["tasks"][0]["status"], "pending");
        assert_eq!(raw["tasks"][0]["timeSpentMinutes"], 0);
        assert!(raw["tasks"][0].get("completedAt").is_none());
    }

    #[tokio::test]
    async fn test_bare_array_is_accepted() {
        let (_temp_dir, storage) = setup_storage();
        std::fs::write(
            storage.tasks_file(),
            r#"[{"id": 3, "name": "Legacy", "durationMinutes": 25, "createdAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let loaded = storage.load_tasks().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 3);
        assert!(loaded[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_and_invalid_content() {
        let (_temp_dir, storage) = setup_storage();

        std::fs::write(storage.tasks_file(), "{ not json").unwrap();
        assert!(storage.load_tasks().await.is_err());

        std::fs::write(
            storage.tasks_file(),
            r#"{"version": 1, "tasks": [
                {"id": 1, "name": "A", "durationMinutes": 25, "createdAt": "2024-01-01T00:00:00Z"},
                {"id": 1, "name": "B", "durationMinutes": 25, "createdAt": "2024-01-01T00:00:00Z"}
            ]}"#,
        )
        .unwrap();
        let err = storage.load_tasks().await.unwrap_err();
        assert!(err.to_string().contains("duplicate task id 1"));
    }

    #[tokio::test]
    async fn test_hand_edited_tags_are_normalized() {
        let (_temp_dir, storage) = setup_storage();
        std::fs::write(
            storage.tasks_file(),
            r#"[{"id": 1, "name": "Edited", "durationMinutes": 25, "tags": ["Work", " work ", "Deep"], "createdAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let loaded = storage.load_tasks().await.unwrap().unwrap();
        let tags: Vec<_> = loaded[0].tags.iter().map(String::as_str).collect();
        assert_eq!(tags, ["deep", "work"]);

        std::fs::write(
            storage.tasks_file(),
            r#"[{"id": 1, "name": "Edited", "durationMinutes": 25, "tags": ["two words"], "createdAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let err = storage.load_tasks().await.unwrap_err();
        assert!(matches!(err, TimerError::StorageError { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_parse_error() {
        let (_temp_dir, storage) = setup_storage();
        std::fs::write(storage.tasks_file(), b"{\"version\": 1, \"tasks\": [\xff\xfe").unwrap();

        let err = storage.load_tasks().await.unwrap_err();
        assert!(!matches!(err, TimerError::FileReadError { .. }));
        assert_eq!(err.kind(), crate::errors::ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_whitespace_only_file_is_empty() {
        let (_temp_dir, storage) = setup_storage();
        std::fs::write(storage.tasks_file(), " \n\t").unwrap();
        assert_eq!(storage.load_tasks().await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_quarantine_moves_file_aside() {
        let (temp_dir, storage) = setup_storage();
        std::fs::write(storage.tasks_file(), "garbage").unwrap();

        let backup = storage.quarantine().await.unwrap();
        assert!(!storage.tasks_file().exists());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "garbage");
        assert!(backup.starts_with(&temp_dir.path().display().to_string()));
        assert!(backup.contains("tasks.json.corrupt-"));
    }
}
