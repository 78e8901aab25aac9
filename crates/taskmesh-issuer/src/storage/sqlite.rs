//! SQLite storage backend
//!
//! Persistent storage implementation using SQLite.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: SQLite connection string,
//!   e.g. `sqlite://taskmesh.db` or `sqlite::memory:`

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use taskmesh_core::{Subject, SubjectId};
use tracing::{error, info};

use super::{NewSubject, StorageError, SubjectRecord, SubjectStore};

/// SQLite subject store implementation
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `database_url` and migrate it
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!("Connected to SQLite database");

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and migrate it
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        info!("Database migrations complete");
        Ok(())
    }
}

fn subject_from_row(row: &SqliteRow) -> Result<Subject, sqlx::Error> {
    Ok(Subject {
        id: row.try_get("id")?,
        handle: row.try_get("username")?,
        contact: row.try_get("email")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn database_error(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

#[async_trait]
impl SubjectStore for SqliteStore {
    async fn insert(&self, new: NewSubject) -> Result<Subject, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&new.handle)
        .bind(&new.contact)
        .bind(&new.verifier)
        .bind(new.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorageError::AlreadyExists(db.message().to_string())
            }
            other => {
                error!(username = %new.handle, error = %other, "Failed to insert subject");
                database_error(other)
            }
        })?;

        let subject = Subject {
            id: result.last_insert_rowid(),
            handle: new.handle,
            contact: new.contact,
            created_at: new.created_at,
        };

        info!(user_id = subject.id, username = %subject.handle, "Stored subject in database");
        Ok(subject)
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<SubjectRecord>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(|r| {
            Ok(SubjectRecord {
                subject: subject_from_row(&r)?,
                verifier: r.try_get("password_hash")?,
            })
        })
        .transpose()
        .map_err(database_error)
    }

    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref()
            .map(subject_from_row)
            .transpose()
            .map_err(database_error)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(count as u64)
    }
}
