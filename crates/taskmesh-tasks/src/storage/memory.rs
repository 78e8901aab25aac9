//! In-memory task store
//!
//! Tasks live in a single locked map and are lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use taskmesh_core::SubjectId;

use super::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskStore, TaskStoreError, DEFAULT_STATUS};

#[derive(Debug, Default)]
struct Inner {
    last_id: TaskId,
    tasks: HashMap<TaskId, Task>,
}

/// In-memory task store implementation
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    inner: RwLock<Inner>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, TaskStoreError> {
        self.inner
            .read()
            .map_err(|_| TaskStoreError::Database("task map lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, TaskStoreError> {
        self.inner
            .write()
            .map_err(|_| TaskStoreError::Database("task map lock poisoned".into()))
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, new: NewTask) -> Result<Task, TaskStoreError> {
        let mut inner = self.write()?;
        inner.last_id += 1;

        let task = Task {
            id: inner.last_id,
            title: new.title,
            description: new.description,
            status: DEFAULT_STATUS.to_string(),
            priority: new.priority,
            user_id: new.user_id,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list(&self, owner: SubjectId, filter: &TaskFilter) -> Result<Vec<Task>, TaskStoreError> {
        let inner = self.read()?;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.user_id == owner && filter.matches(t))
            .cloned()
            .collect();

        // Ids break ties between tasks created in the same instant
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn get(&self, owner: SubjectId, id: TaskId) -> Result<Option<Task>, TaskStoreError> {
        let inner = self.read()?;
        Ok(inner.tasks.get(&id).filter(|t| t.user_id == owner).cloned())
    }

    async fn update(
        &self,
        owner: SubjectId,
        id: TaskId,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskStoreError> {
        let mut inner = self.write()?;
        let Some(task) = inner.tasks.get_mut(&id).filter(|t| t.user_id == owner) else {
            return Ok(None);
        };
        patch.apply(task, now);
        Ok(Some(task.clone()))
    }

    async fn delete(&self, owner: SubjectId, id: TaskId) -> Result<bool, TaskStoreError> {
        let mut inner = self.write()?;
        if inner.tasks.get(&id).is_some_and(|t| t.user_id == owner) {
            inner.tasks.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> Result<u64, TaskStoreError> {
        Ok(self.read()?.tasks.len() as u64)
    }
}
