//! In-memory storage backend
//!
//! Default storage implementation using a single locked map.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use taskmesh_core::{Subject, SubjectId};
use tracing::info;

use super::{NewSubject, StorageError, SubjectRecord, SubjectStore};

#[derive(Debug, Default)]
struct Inner {
    last_id: SubjectId,
    subjects: HashMap<SubjectId, SubjectRecord>,
}

/// In-memory subject store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StorageError> {
        self.inner
            .read()
            .map_err(|_| StorageError::Database("subject map lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StorageError> {
        self.inner
            .write()
            .map_err(|_| StorageError::Database("subject map lock poisoned".into()))
    }
}

#[async_trait]
impl SubjectStore for MemoryStore {
    async fn insert(&self, new: NewSubject) -> Result<Subject, StorageError> {
        let mut inner = self.write()?;

        if let Some(existing) = inner.subjects.values().find(|r| {
            r.subject.handle == new.handle || r.subject.contact == new.contact
        }) {
            let field = if existing.subject.handle == new.handle {
                "username"
            } else {
                "email"
            };
            return Err(StorageError::AlreadyExists(field.into()));
        }

        inner.last_id += 1;
        let subject = Subject {
            id: inner.last_id,
            handle: new.handle,
            contact: new.contact,
            created_at: new.created_at,
        };

        info!(user_id = subject.id, username = %subject.handle, "Stored subject");
        inner.subjects.insert(
            subject.id,
            SubjectRecord {
                subject: subject.clone(),
                verifier: new.verifier,
            },
        );

        Ok(subject)
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<SubjectRecord>, StorageError> {
        let inner = self.read()?;
        Ok(inner
            .subjects
            .values()
            .find(|r| r.subject.handle == handle)
            .cloned())
    }

    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Subject>, StorageError> {
        let inner = self.read()?;
        Ok(inner.subjects.get(&id).map(|r| r.subject.clone()))
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.read()?.subjects.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_subject(handle: &str, contact: &str) -> NewSubject {
        NewSubject {
            handle: handle.into(),
            contact: contact.into(),
            verifier: "$argon2id$stub".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.insert(new_subject("alice", "a@x.test")).await.unwrap();
        let b = store.insert(new_subject("bob", "b@x.test")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_handle_rejected() {
        let store = MemoryStore::new();
        store.insert(new_subject("alice", "a@x.test")).await.unwrap();

        let err = store
            .insert(new_subject("alice", "other@x.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(ref f) if f == "username"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_contact_rejected() {
        let store = MemoryStore::new();
        store.insert(new_subject("alice", "a@x.test")).await.unwrap();

        let err = store.insert(new_subject("bob", "a@x.test")).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(ref f) if f == "email"));
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = MemoryStore::new();
        let alice = store.insert(new_subject("alice", "a@x.test")).await.unwrap();

        let record = store.find_by_handle("alice").await.unwrap().unwrap();
        assert_eq!(record.subject, alice);
        assert_eq!(record.verifier, "$argon2id$stub");

        assert_eq!(store.find_by_id(alice.id).await.unwrap(), Some(alice));
        assert!(store.find_by_handle("Alice").await.unwrap().is_none());
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }
}
