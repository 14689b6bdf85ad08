//! Storage trait definitions.

use async_trait::async_trait;

use crate::entities::Task;
use crate::errors::TimerResult;

/// Persistence backend for the task collection.
///
/// Implementations persist the whole collection at once; there is no
/// per-task write path.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get storage type identifier
    fn storage_type(&self) -> &'static str;

    /// Human readable location, used in messages
    fn location(&self) -> String;

    /// Load the persisted collection.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet. Content that
    /// exists but cannot be understood is an error.
    async fn load_tasks(&self) -> TimerResult<Option<Vec<Task>>>;

    /// Replace the persisted collection. Must be atomic.
    async fn save_tasks(&self, tasks: &[Task]) -> TimerResult<()>;

    /// Move unreadable persisted data aside so it can be recovered by hand.
    ///
    /// Returns the location it was moved to.
    async fn quarantine(&self) -> TimerResult<String>;
}
