//! Storage abstraction for tasks
//!
//! Every read and write is scoped to an owner: a task that belongs to another
//! subject is indistinguishable from one that does not exist.

pub mod memory;

pub use memory::MemoryTaskStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use taskmesh_core::SubjectId;

/// Task identifier
pub type TaskId = i64;

/// Status given to new tasks
pub const DEFAULT_STATUS: &str = "pending";

/// Priority given to new tasks that do not name one
pub const DEFAULT_PRIORITY: &str = "medium";

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    #[error("Database error: {0}")]
    Database(String),
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub user_id: SubjectId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task about to be inserted; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub user_id: SubjectId,
    pub created_at: DateTime<Utc>,
}

/// Fields to change; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskPatch {
    /// Apply to `task`, stamping `updated_at` with `now`
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        task.updated_at = now;
    }
}

/// Optional exact-match filters for listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.as_deref().map_or(true, |s| task.status == s)
            && self.priority.as_deref().map_or(true, |p| task.priority == p)
    }
}

/// Storage backend trait for tasks
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait TaskStore: Send + Sync + Debug {
    /// Insert a task with status [`DEFAULT_STATUS`]
    async fn insert(&self, task: NewTask) -> Result<Task, TaskStoreError>;

    /// Tasks owned by `owner` that match `filter`, newest first
    async fn list(&self, owner: SubjectId, filter: &TaskFilter) -> Result<Vec<Task>, TaskStoreError>;

    /// Task `id` if `owner` owns it
    async fn get(&self, owner: SubjectId, id: TaskId) -> Result<Option<Task>, TaskStoreError>;

    /// Apply `patch` to task `id` if `owner` owns it
    async fn update(
        &self,
        owner: SubjectId,
        id: TaskId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskStoreError>;

    /// Delete task `id` if `owner` owns it; `false` when nothing was removed
    async fn delete(&self, owner: SubjectId, id: TaskId) -> Result<bool, TaskStoreError>;

    /// Number of stored tasks across all owners
    async fn count(&self) -> Result<u64, TaskStoreError>;
}
