//! Task API endpoints
//!
//! RESTful API for task CRUD operations.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tasksync_core::{Error, Priority, Task, TaskId, TaskPatch, TaskQuery};

use crate::state::AppState;
use crate::store::TaskInput;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 100;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksParams {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

fn store_error(e: Error) -> ApiError {
    match e {
        Error::TaskNotFound(_) => api_error(StatusCode::NOT_FOUND, "Task not found"),
        Error::Validation(message) => api_error(StatusCode::UNPROCESSABLE_ENTITY, message),
        other => {
            tracing::error!("Task store failure: {}", other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn unprocessable(detail: String) -> ApiError {
    api_error(StatusCode::UNPROCESSABLE_ENTITY, detail)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - List tasks matching the query
async fn list_tasks(
    State(state): State<AppState>,
    params: Result<Query<ListTasksParams>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Query(params) = params.map_err(|e| unprocessable(e.body_text()))?;

    let skip = params.skip.unwrap_or(0);
    if skip < 0 {
        return Err(unprocessable("skip must be greater than or equal to 0".to_string()));
    }
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(unprocessable(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let query = TaskQuery {
        completed: params.completed,
        priority: params.priority,
        search: params.search,
    };
    let tasks = state
        .task_store()
        .list(&query, skip as usize, limit as usize)
        .await;

    tracing::debug!("Listed {} tasks for '{}'", tasks.len(), query);
    Ok(Json(tasks))
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(req) = body.map_err(|e| unprocessable(e.body_text()))?;

    let created = state
        .task_store()
        .create(TaskInput {
            title: req.title,
            description: req.description.unwrap_or_default(),
            priority: req.priority,
            completed: req.completed,
        })
        .await
        .map_err(store_error)?;

    tracing::info!("Created task {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /tasks/:id - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let task = state.task_store().get(id).await.map_err(store_error)?;
    Ok(Json(task))
}

/// PATCH /tasks/:id - Update a task
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(patch) = body.map_err(|e| unprocessable(e.body_text()))?;

    let updated = state
        .task_store()
        .update(id, patch)
        .await
        .map_err(store_error)?;

    tracing::info!("Updated task {}", id);
    Ok(Json(updated))
}

/// DELETE /tasks/:id - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    state.task_store().delete(id).await.map_err(store_error)?;

    tracing::info!("Deleted task {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::AppState;

    fn app() -> Router {
        super::router().with_state(AppState::new())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, title: &str, priority: &str, completed: bool) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/tasks",
            Some(json!({
                "title": title,
                "description": "",
                "priority": priority,
                "completed": completed
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    fn titles(body: &Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn create_then_fetch_task() {
        let app = app();
        let created = create(&app, "Buy milk", "high", false).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["priority"], "high");
        assert_eq!(created["completed"], false);
        assert!(created["created_at"].is_string());

        let (status, fetched) = send(&app, "GET", "/tasks/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_defaults_optional_fields() {
        let app = app();
        let (status, body) = send(&app, "POST", "/tasks", Some(json!({"title": "Walk dog"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["priority"], "medium");
        assert_eq!(body["description"], "");
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let app = app();

        let (status, body) = send(&app, "POST", "/tasks", Some(json!({"title": "  "}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Title cannot be empty");

        let long = "x".repeat(201);
        let (status, _) = send(&app, "POST", "/tasks", Some(json!({"title": long}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            "POST",
            "/tasks",
            Some(json!({"title": "Ok", "priority": "urgent"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (_, list) = send(&app, "GET", "/tasks", None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_query() {
        let app = app();
        create(&app, "Buy milk", "high", false).await;
        create(&app, "Buy bread", "low", true).await;
        create(&app, "Call mom", "high", false).await;

        let (_, body) = send(&app, "GET", "/tasks?priority=high", None).await;
        assert_eq!(titles(&body), vec!["Buy milk", "Call mom"]);

        let (_, body) = send(&app, "GET", "/tasks?completed=true", None).await;
        assert_eq!(titles(&body), vec!["Buy bread"]);

        let (_, body) = send(&app, "GET", "/tasks?completed=false&priority=high&search=CALL", None).await;
        assert_eq!(titles(&body), vec!["Call mom"]);

        let (_, body) = send(&app, "GET", "/tasks?search=buy%20m", None).await;
        assert_eq!(titles(&body), vec!["Buy milk"]);

        let (_, body) = send(&app, "GET", "/tasks?skip=1&limit=1", None).await;
        assert_eq!(titles(&body), vec!["Buy bread"]);
    }

    #[tokio::test]
    async fn list_rejects_bad_paging_and_filters() {
        let app = app();
        for uri in [
            "/tasks?skip=-1",
            "/tasks?limit=0",
            "/tasks?limit=101",
            "/tasks?priority=urgent",
            "/tasks?completed=maybe",
        ] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
            assert!(body["detail"].is_string(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn patch_applies_present_fields_only() {
        let app = app();
        create(&app, "Buy milk", "high", false).await;

        let (status, body) = send(&app, "PATCH", "/tasks/1", Some(json!({"completed": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed"], true);
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["priority"], "high");

        let (status, body) = send(&app, "PATCH", "/tasks/1", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Title cannot be empty");
    }

    #[tokio::test]
    async fn invalid_patch_is_rejected_before_id_lookup() {
        let app = app();
        let (status, body) = send(&app, "PATCH", "/tasks/99", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Title cannot be empty");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app();
        for (method, body) in [
            ("GET", None),
            ("PATCH", Some(json!({"completed": true}))),
            ("DELETE", None),
        ] {
            let (status, response) = send(&app, method, "/tasks/99", body).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", method);
            assert_eq!(response["detail"], "Task not found");
        }
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let app = app();
        create(&app, "Buy milk", "high", false).await;
        create(&app, "Call mom", "high", false).await;

        let (status, body) = send(&app, "DELETE", "/tasks/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (_, list) = send(&app, "GET", "/tasks", None).await;
        assert_eq!(titles(&list), vec!["Call mom"]);
    }
}
