//! Task store: the in-memory collection and its persistence.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::entities::{EffectiveConfig, Task};
use crate::errors::{TimerError, TimerResult};
use crate::storage::{FileStorage, Storage};

/// Raised when persisted data could not be loaded at startup.
///
/// The store is still usable; `backup` says where the unreadable data went.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    pub error: TimerError,
    pub backup: Option<String>,
}

/// Owns the task collection for the lifetime of the process
pub struct TaskStore {
    storage: Arc<dyn Storage>,
    tasks: Vec<Task>,
    /// Set when existing data could not be preserved; saving would destroy it.
    write_blocked: Option<String>,
}

impl TaskStore {
    /// Open the store, loading whatever the backend has persisted.
    ///
    /// Never fails: unreadable data is moved aside and the store starts empty.
    pub async fn open(storage: Arc<dyn Storage>) -> (Self, Option<LoadWarning>) {
        let mut store = Self {
            storage,
            tasks: Vec::new(),
            write_blocked: None,
        };
        let warning = store.load().await;
        (store, warning)
    }

    /// Open the JSON data file named by the effective configuration.
    pub async fn open_file(config: &EffectiveConfig) -> (Self, Option<LoadWarning>) {
        Self::open(Arc::new(FileStorage::new(config.data_file()))).await
    }

    /// (Re)load the collection from the backend.
    pub async fn load(&mut self) -> Option<LoadWarning> {
        self.tasks.clear();
        self.write_blocked = None;

        let error = match self.storage.load_tasks().await {
            Ok(Some(tasks)) => {
                debug!(
                    storage = self.storage.storage_type(),
                    count = tasks.len(),
                    "Task store opened"
                );
                self.tasks = tasks;
                return None;
            }
            Ok(None) => return None,
            Err(e) => e,
        };

        let location = self.storage.location();
        let readable = !matches!(error, TimerError::FileReadError { .. });

        let backup = if readable {
            match self.storage.quarantine().await {
                Ok(backup) => {
                    warn!(
                        path = %location,
                        backup = %backup,
                        error = %error,
                        "Data file unreadable, moved aside and starting empty"
                    );
                    Some(backup)
                }
                Err(e) => {
                    warn!(path = %location, error = %e, "Could not back up unreadable data file");
                    None
                }
            }
        } else {
            None
        };

        if backup.is_none() {
            warn!(path = %location, error = %error, "Data file left untouched; changes will not be saved");
            self.write_blocked = Some(format!(
                "existing data at {location} could not be loaded or backed up; refusing to overwrite it"
            ));
        }

        Some(LoadWarning {
            error: TimerError::StorageError {
                reason: format!("could not load {location}: {error}"),
            },
            backup,
        })
    }

    /// Persist the whole collection.
    pub async fn save(&self) -> TimerResult<()> {
        if let Some(reason) = &self.write_blocked {
            return Err(TimerError::StorageError {
                reason: reason.clone(),
            });
        }
        self.storage.save_tasks(&self.tasks).await
    }

    /// Next id: one past the largest id ever kept, or 1 when empty.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Add a new pending task and persist it.
    pub async fn add<I, S>(&mut self, name: &str, duration_minutes: u32, tags: I) -> TimerResult<Task>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let task = Task::new(self.next_id(), name, duration_minutes, tags)?;
        self.tasks.push(task.clone());
        if let Err(e) = self.save().await {
            self.tasks.pop();
            return Err(e);
        }

        info!(id = task.id, name = %task.name, "Task added");
        Ok(task)
    }

    /// Tasks in insertion order, optionally restricted to one tag.
    pub fn list(&self, filter_tag: Option<&str>) -> impl Iterator<Item = &Task> + '_ {
        let filter = filter_tag.map(|t| t.trim().to_lowercase());
        self.tasks
            .iter()
            .filter(move |t| filter.as_deref().map_or(true, |f| t.tags.contains(f)))
    }

    /// Get a task by id
    pub fn get(&self, id: u64) -> TimerResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(TimerError::TaskNotFound { id })
    }

    fn position(&self, id: u64) -> TimerResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TimerError::TaskNotFound { id })
    }

    /// Remove a task and persist.
    pub async fn delete(&mut self, id: u64) -> TimerResult<Task> {
        let idx = self.position(id)?;
        let removed = self.tasks.remove(idx);

        if let Err(e) = self.save().await {
            self.tasks.insert(idx, removed);
            return Err(e);
        }

        info!(id, "Task deleted");
        Ok(removed)
    }

    /// Mark a task completed with `actual_minutes` of credit and persist.
    pub async fn complete(&mut self, id: u64, actual_minutes: u32) -> TimerResult<Task> {
        let idx = self.position(id)?;
        let before = self.tasks[idx].clone();
        self.tasks[idx].mark_complete(actual_minutes)?;

        if let Err(e) = self.save().await {
            self.tasks[idx] = before;
            return Err(e);
        }

        info!(id, minutes = actual_minutes, "Task completed");
        Ok(self.tasks[idx].clone())
    }

    /// Read-only view of every task, in insertion order.
    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Backend location, for messages.
    pub fn location(&self) -> String {
        self.storage.location()
    }
}
