//! Application state

use std::sync::Arc;

use crate::store::MemoryTaskStore;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Default)]
struct AppStateInner {
    task_store: MemoryTaskStore,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &MemoryTaskStore {
        &self.inner.task_store
    }
}
