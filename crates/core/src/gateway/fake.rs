//! Scripted in-memory gateway for tests

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::TaskGateway;
use crate::task::{NewTask, Priority, Task, TaskId, TaskPatch, TaskQuery};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(TaskQuery),
    Get(TaskId),
    Create(NewTask),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
}

#[derive(Default)]
struct FakeState {
    tasks: Vec<Task>,
    next_id: TaskId,
    calls: Vec<Call>,
    failures: HashMap<&'static str, String>,
    list_delays: VecDeque<Duration>,
}

/// Filters like the real store, records every call, and can be told to
/// fail or answer slowly
#[derive(Default)]
pub(crate) struct FakeGateway {
    state: Mutex<FakeState>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn seed(&self, title: &str, priority: Priority, completed: bool) -> Task {
        let mut state = self.state.lock();
        state.next_id += 1;
        let now = Utc::now();
        let task = Task {
            id: state.next_id,
            title: title.to_string(),
            description: String::new(),
            priority,
            completed,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        task
    }

    /// Make the next call of the named operation fail
    pub(crate) fn fail_next(&self, operation: &'static str, message: &str) {
        self.state
            .lock()
            .failures
            .insert(operation, message.to_string());
    }

    /// Delay the next list responses, one entry per call
    pub(crate) fn delay_lists(&self, delays: &[Duration]) {
        self.state.lock().list_delays.extend(delays.iter().copied());
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub(crate) fn list_calls(&self) -> Vec<TaskQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn begin(&self, call: Call, operation: &'static str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.remove(operation) {
            Some(message) => Err(Error::transport(message)),
            None => Ok(()),
        }
    }
}

fn matches(task: &Task, query: &TaskQuery) -> bool {
    query.completed.map_or(true, |c| task.completed == c)
        && query.priority.map_or(true, |p| task.priority == p)
        && query.search.as_ref().map_or(true, |s| {
            task.title.contains(s.as_str()) || task.description.contains(s.as_str())
        })
}

#[async_trait]
impl TaskGateway for FakeGateway {
    async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let outcome = self.begin(Call::List(query.clone()), "list");
        let (tasks, delay) = {
            let mut state = self.state.lock();
            let tasks: Vec<Task> = state
                .tasks
                .iter()
                .filter(|task| matches(task, query))
                .cloned()
                .collect();
            (tasks, state.list_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome.map(|_| tasks)
    }

    async fn get(&self, id: TaskId) -> Result<Task> {
        self.begin(Call::Get(id), "get")?;
        let state = self.state.lock();
        state
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| Error::transport("GET returned 404 Not Found: Task not found"))
    }

    async fn create(&self, task: &NewTask) -> Result<Task> {
        self.begin(Call::Create(task.clone()), "create")?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let now = Utc::now();
        let created = Task {
            id: state.next_id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            completed: task.completed,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        self.begin(Call::Update(id, patch.clone()), "update")?;
        let mut state = self.state.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::transport("PATCH returned 404 Not Found: Task not found"))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now() + chrono::Duration::seconds(1);
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        self.begin(Call::Delete(id), "delete")?;
        self.state.lock().tasks.retain(|task| task.id != id);
        Ok(())
    }
}
