//! Remote gateway
//!
//! Defines the interface to the authoritative task store.

mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskQuery};
use crate::Result;

pub use http::HttpTaskGateway;

/// Remote task store operations
///
/// Every failure is reported as [`crate::Error::Transport`].
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// List tasks matching the query, in the store's order
    async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>>;

    /// Get a task by ID
    async fn get(&self, id: TaskId) -> Result<Task>;

    /// Create a task and return it as stored
    async fn create(&self, task: &NewTask) -> Result<Task>;

    /// Apply a partial update and return the full stored task
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task>;

    /// Delete a task by ID
    async fn delete(&self, id: TaskId) -> Result<()>;
}
