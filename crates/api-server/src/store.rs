//! In-memory task storage

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use tasksync_core::task::{validate_description, validate_title};
use tasksync_core::{Error, Priority, Result, Task, TaskId, TaskPatch, TaskQuery};

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    last_id: TaskId,
}

/// Task storage keyed by id, ids are handed out in increasing order
#[derive(Default)]
pub struct MemoryTaskStore {
    inner: RwLock<Inner>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching tasks in ascending id order
    pub async fn list(&self, query: &TaskQuery, skip: usize, limit: usize) -> Vec<Task> {
        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let inner = self.inner.read().await;
        inner
            .tasks
            .values()
            .filter(|task| query.completed.map_or(true, |c| task.completed == c))
            .filter(|task| query.priority.map_or(true, |p| task.priority == p))
            .filter(|task| {
                search.as_ref().map_or(true, |needle| {
                    task.title.to_lowercase().contains(needle.as_str())
                        || task.description.to_lowercase().contains(needle.as_str())
                })
            })
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: TaskId) -> Result<Task> {
        self.inner
            .read()
            .await
            .tasks
            .get(&id)
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task> {
        validate_title(&input.title)?;
        validate_description(&input.description)?;

        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.last_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        patch.validate()?;

        let mut inner = self.inner.write().await;
        let task = inner.tasks.get_mut(&id).ok_or(Error::TaskNotFound(id))?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    pub async fn delete(&self, id: TaskId) -> Result<()> {
        self.inner
            .write()
            .await
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::TaskNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, priority: Priority, completed: bool) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            priority,
            completed,
            ..Default::default()
        }
    }

    async fn seeded() -> MemoryTaskStore {
        let store = MemoryTaskStore::new();
        store.create(input("Buy milk", Priority::High, false)).await.unwrap();
        store.create(input("Buy bread", Priority::Low, true)).await.unwrap();
        store.create(input("Call mom", Priority::High, false)).await.unwrap();
        store
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let store = seeded().await;
        let tasks = store.list(&TaskQuery::default(), 0, 100).await;
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = seeded().await;

        let query = TaskQuery {
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert_eq!(titles(&store.list(&query, 0, 100).await), vec!["Buy milk", "Call mom"]);

        let query = TaskQuery {
            completed: Some(true),
            ..Default::default()
        };
        assert_eq!(titles(&store.list(&query, 0, 100).await), vec!["Buy bread"]);

        let query = TaskQuery {
            search: Some("BUY".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&store.list(&query, 0, 100).await), vec!["Buy milk", "Buy bread"]);
    }

    #[tokio::test]
    async fn test_list_skip_and_limit() {
        let store = seeded().await;
        let tasks = store.list(&TaskQuery::default(), 1, 1).await;
        assert_eq!(titles(&tasks), vec!["Buy bread"]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let store = MemoryTaskStore::new();
        let err = store.create(input("   ", Priority::Low, false)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.list(&TaskQuery::default(), 0, 100).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_present_fields() {
        let store = seeded().await;
        let before = store.get(1).await.unwrap();

        let updated = store
            .update(1, TaskPatch::default().completed(true))
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = seeded().await;
        assert_eq!(store.get(42).await.unwrap_err(), Error::TaskNotFound(42));
        assert_eq!(
            store.update(42, TaskPatch::default().title("x")).await.unwrap_err(),
            Error::TaskNotFound(42)
        );
        assert_eq!(store.delete(42).await.unwrap_err(), Error::TaskNotFound(42));
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let store = seeded().await;
        let err = store
            .update(42, TaskPatch::default().title(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_keeps_ids_unique() {
        let store = seeded().await;
        store.delete(3).await.unwrap();
        let task = store.create(input("Walk dog", Priority::Medium, false)).await.unwrap();
        assert_eq!(task.id, 4);
    }
}
