//! Task handlers
//!
//! All of these run behind the guard and act only on the caller's own tasks.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use taskmesh_guard::AuthenticatedSubject;
use tracing::info;

use super::AppState;
use crate::api::error::ApiError;
use crate::events::{TASK_CREATED, TASK_DELETED, TASK_UPDATED};
use crate::storage::{NewTask, Task, TaskFilter, TaskId, TaskPatch, DEFAULT_PRIORITY};

/// Query string for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Request to create a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Option<String>,
}

/// Request to update a task; absent or blank fields are left alone
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(request: UpdateTaskRequest) -> Self {
        TaskPatch {
            title: non_blank(request.title),
            description: non_blank(request.description),
            status: non_blank(request.status),
            priority: non_blank(request.priority),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid task ID".into()))
}

fn not_found(id: TaskId) -> ApiError {
    ApiError::NotFound(format!("Task {} not found", id))
}

fn event_data(task: &Task) -> Value {
    serde_json::to_value(task).unwrap_or(Value::Null)
}

/// List the caller's tasks, newest first
///
/// GET /api/tasks?status=&priority=
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthenticatedSubject(who): AuthenticatedSubject,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = TaskFilter {
        status: non_blank(query.status),
        priority: non_blank(query.priority),
    };
    Ok(Json(state.store.list(who.subject_id, &filter).await?))
}

/// Create a task owned by the caller
///
/// POST /api/tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedSubject(who): AuthenticatedSubject,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = body?;
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".into()));
    }

    let task = state
        .store
        .insert(NewTask {
            title: title.to_string(),
            description: request.description,
            priority: non_blank(request.priority).unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            user_id: who.subject_id,
            created_at: Utc::now(),
        })
        .await?;

    info!(task_id = task.id, user_id = who.subject_id, "Task created");
    state.events.publish(TASK_CREATED, event_data(&task));

    Ok((StatusCode::CREATED, Json(task)))
}

/// One of the caller's tasks
///
/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedSubject(who): AuthenticatedSubject,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .get(who.subject_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Change some fields of one of the caller's tasks
///
/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedSubject(who): AuthenticatedSubject,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = body?;

    let task = state
        .store
        .update(who.subject_id, id, request.into(), Utc::now())
        .await?
        .ok_or_else(|| not_found(id))?;

    info!(task_id = task.id, user_id = who.subject_id, "Task updated");
    state.events.publish(TASK_UPDATED, event_data(&task));

    Ok(Json(task))
}

/// Delete one of the caller's tasks
///
/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedSubject(who): AuthenticatedSubject,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(who.subject_id, id).await? {
        return Err(not_found(id));
    }

    info!(task_id = id, user_id = who.subject_id, "Task deleted");
    state
        .events
        .publish(TASK_DELETED, json!({"id": id, "user_id": who.subject_id}));

    Ok(StatusCode::NO_CONTENT)
}
