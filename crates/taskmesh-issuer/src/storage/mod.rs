//! Storage abstraction for subject records
//!
//! This module provides a trait-based abstraction over where subjects live,
//! enabling both in-memory (default) and persistent (SQLite) backends.
//!
//! Uniqueness of handle and contact is the store's job: an insert that would
//! collide fails with [`StorageError::AlreadyExists`] without writing anything.

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use taskmesh_core::{Subject, SubjectId};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Subject already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// A subject about to be inserted; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewSubject {
    pub handle: String,
    pub contact: String,
    /// PHC-encoded passphrase digest
    pub verifier: String,
    pub created_at: DateTime<Utc>,
}

/// A stored subject together with its secret verifier
#[derive(Debug, Clone)]
pub struct SubjectRecord {
    pub subject: Subject,
    pub verifier: String,
}

/// Storage backend trait for subjects
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait SubjectStore: Send + Sync + Debug {
    /// Insert a subject, failing if the handle or contact is taken
    async fn insert(&self, subject: NewSubject) -> Result<Subject, StorageError>;

    /// Find a subject and its verifier by handle
    async fn find_by_handle(&self, handle: &str) -> Result<Option<SubjectRecord>, StorageError>;

    /// Find a subject by id
    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Subject>, StorageError>;

    /// Number of stored subjects
    async fn count(&self) -> Result<u64, StorageError>;
}
