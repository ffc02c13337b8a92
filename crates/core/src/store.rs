//! Synchronization store
//!
//! Owns the visible task list, the loading flag and the single error slot.
//! Every change goes through this type; readers get snapshots or subscribe
//! to change notifications.
//!
//! List requests are numbered when they are issued. A response is applied
//! only if its number is still the latest one, so a slow reply to an old
//! filter can never overwrite the list for a newer filter.

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::filter::FilterCriteria;
use crate::gateway::TaskGateway;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch, TaskQuery};
use crate::{Error, Result};

/// What the store was doing when a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchTasks => "fetch tasks",
            Self::CreateTask => "create task",
            Self::UpdateTask => "update task",
            Self::DeleteTask => "delete task",
        }
    }
}

/// The user-visible error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub operation: Operation,
    pub cause: Error,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to {}: {}", self.operation.as_str(), self.cause)
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Tasks in the order the remote store returned them
    pub tasks: Vec<Task>,
    /// True while the latest list request is in flight
    pub loading: bool,
    pub error: Option<SyncFailure>,
    latest_request: u64,
}

impl SyncState {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of the most recently issued list request
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }
}

/// Canonical task list, kept in step with the remote store
///
/// Cloning gives another handle to the same state.
#[derive(Clone)]
pub struct SyncStore {
    gateway: Arc<dyn TaskGateway>,
    state: Arc<watch::Sender<SyncState>>,
}

impl SyncStore {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            gateway,
            state: Arc::new(state),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn TaskGateway> {
        &self.gateway
    }

    pub fn snapshot(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.state.borrow().task(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<SyncFailure> {
        self.state.borrow().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Replace the list with the remote store's answer for `criteria`
    ///
    /// The request is numbered and `loading` is raised as soon as this is
    /// called, before the returned future is polled. The future resolves to
    /// the number of tasks applied, [`Error::StaleResponse`] if a newer
    /// request was issued meanwhile, or the transport error.
    pub fn refetch(&self, criteria: FilterCriteria) -> BoxFuture<'static, Result<usize>> {
        let query = criteria.to_query();
        let mut request = 0;
        self.state.send_modify(|state| {
            state.latest_request += 1;
            request = state.latest_request;
            state.loading = true;
            state.error = None;
        });
        debug!("List request #{} issued: '{}'", request, query);

        let store = self.clone();
        async move { store.complete_refetch(request, query).await }.boxed()
    }

    async fn complete_refetch(self, request: u64, query: TaskQuery) -> Result<usize> {
        let response = self.gateway.list(&query).await;

        let mut outcome = Ok(0);
        self.state.send_if_modified(|state| {
            if state.latest_request != request {
                outcome = Err(Error::StaleResponse {
                    request,
                    latest: state.latest_request,
                });
                return false;
            }

            state.loading = false;
            match response {
                Ok(tasks) => {
                    outcome = Ok(tasks.len());
                    state.tasks = tasks;
                }
                Err(e) => {
                    state.error = Some(SyncFailure {
                        operation: Operation::FetchTasks,
                        cause: e.clone(),
                    });
                    outcome = Err(e);
                }
            }
            true
        });

        match &outcome {
            Ok(count) => info!("List request #{} applied: {} tasks", request, count),
            Err(Error::StaleResponse { latest, .. }) => {
                debug!("List request #{} discarded, #{} is newer", request, latest)
            }
            Err(e) => warn!("List request #{} failed: {}", request, e),
        }
        outcome
    }

    /// Create a task and put it at the top of the list
    ///
    /// Invalid drafts are rejected without contacting the remote store and
    /// without touching the error slot.
    pub async fn create(&self, draft: &TaskDraft) -> Result<Task> {
        draft.validate()?;

        let task = match self.gateway.create(&draft.to_request()).await {
            Ok(task) => task,
            Err(e) => return Err(self.record_failure(Operation::CreateTask, e)),
        };

        self.state.send_modify(|state| {
            state.tasks.insert(0, task.clone());
            state.error = None;
        });
        info!("Task {} created: {}", task.id, task.title);
        Ok(task)
    }

    /// Send a partial update and adopt the remote store's version of the task
    ///
    /// If the task is not in the visible list the list is left alone.
    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        patch.validate()?;

        let task = match self.gateway.update(id, patch).await {
            Ok(task) => task,
            Err(e) => return Err(self.record_failure(Operation::UpdateTask, e)),
        };

        let mut replaced = false;
        self.state.send_modify(|state| {
            if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == id) {
                *slot = task.clone();
                replaced = true;
            }
            state.error = None;
        });

        if replaced {
            info!("Task {} updated", id);
        } else {
            debug!("Task {} updated remotely, not in the visible list", id);
        }
        Ok(task)
    }

    /// Flip completion based on the task as the caller saw it
    pub async fn toggle_complete(&self, task: &Task) -> Result<Task> {
        let patch = TaskPatch::default().completed(!task.completed);
        self.update(task.id, &patch).await
    }

    pub async fn delete(&self, id: TaskId) -> Result<()> {
        if let Err(e) = self.gateway.delete(id).await {
            return Err(self.record_failure(Operation::DeleteTask, e));
        }

        self.state.send_modify(|state| {
            state.tasks.retain(|task| task.id != id);
            state.error = None;
        });
        info!("Task {} deleted", id);
        Ok(())
    }

    fn record_failure(&self, operation: Operation, error: Error) -> Error {
        let failure = SyncFailure {
            operation,
            cause: error.clone(),
        };
        warn!("{}", failure);
        self.state.send_modify(|state| state.error = Some(failure));
        error
    }
}
