//! Credential store
//!
//! Owns subject registration and passphrase checks on top of a
//! [`SubjectStore`]. Passphrases are digested before they reach storage and
//! never leave this module in any form.

use std::sync::Arc;

use chrono::Utc;
use taskmesh_core::{Subject, SubjectId};
use thiserror::Error;
use tokio::task;
use tracing::{info, warn};

use super::passphrase::PassphraseHasher;
use crate::storage::{NewSubject, StorageError, SubjectStore};

/// Handle of the subject created on an empty store in development mode
pub const DEV_ADMIN_HANDLE: &str = "admin";
/// Contact of the development subject
pub const DEV_ADMIN_CONTACT: &str = "admin@taskmanager.com";
/// Passphrase of the development subject
pub const DEV_ADMIN_PASSPHRASE: &str = "admin123";

/// Errors from account operations
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Username, email, and password are required")]
    MissingFields,

    #[error("Username or email already exists")]
    Conflict,

    /// Same message for an unknown handle and a wrong passphrase
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for AccountError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(_) => AccountError::Conflict,
            other => AccountError::Storage(other),
        }
    }
}

/// Registers and authenticates subjects
#[derive(Debug, Clone)]
pub struct CredentialStore {
    store: Arc<dyn SubjectStore>,
    hasher: PassphraseHasher,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn SubjectStore>) -> Self {
        Self {
            store,
            hasher: PassphraseHasher::default(),
        }
    }

    /// Use a hasher with different cost parameters
    pub fn with_hasher(mut self, hasher: PassphraseHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Create a subject
    pub async fn register(
        &self,
        handle: &str,
        contact: &str,
        passphrase: &str,
    ) -> Result<Subject, AccountError> {
        if [handle, contact, passphrase]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AccountError::MissingFields);
        }

        let hasher = self.hasher.clone();
        let owned = passphrase.to_string();
        let verifier = task::spawn_blocking(move || hasher.hash(&owned))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .map_err(|e| AccountError::Hashing(e.to_string()))?;

        let subject = self
            .store
            .insert(NewSubject {
                handle: handle.to_string(),
                contact: contact.to_string(),
                verifier,
                created_at: Utc::now(),
            })
            .await?;

        info!(user_id = subject.id, username = %subject.handle, "Registered subject");
        Ok(subject)
    }

    /// Check a handle and passphrase
    ///
    /// An unknown handle is checked against a decoy digest, so both failures
    /// cost one Argon2 verification.
    pub async fn authenticate(&self, handle: &str, passphrase: &str) -> Result<Subject, AccountError> {
        let record = self.store.find_by_handle(handle).await?;

        let hasher = self.hasher.clone();
        let owned = passphrase.to_string();
        let digest = record.as_ref().map(|r| r.verifier.clone());
        let matched = task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&owned, &digest),
            None => hasher.verify_decoy(&owned),
        })
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?;

        match record {
            Some(record) if matched => Ok(record.subject),
            Some(_) => {
                warn!(username = %handle, "Login with wrong passphrase");
                Err(AccountError::InvalidCredentials)
            }
            None => {
                warn!(username = %handle, "Login for unknown subject");
                Err(AccountError::InvalidCredentials)
            }
        }
    }

    /// Fetch the current record for a subject id
    pub async fn lookup(&self, id: SubjectId) -> Result<Subject, AccountError> {
        self.store.find_by_id(id).await?.ok_or(AccountError::NotFound)
    }

    /// Create the development subject if the store is empty
    ///
    /// Does nothing outside development mode or when any subject exists.
    pub async fn bootstrap(&self, dev_mode: bool) -> Result<Option<Subject>, AccountError> {
        if !dev_mode || self.store.count().await? > 0 {
            return Ok(None);
        }

        let admin = self
            .register(DEV_ADMIN_HANDLE, DEV_ADMIN_CONTACT, DEV_ADMIN_PASSPHRASE)
            .await?;
        warn!(
            username = DEV_ADMIN_HANDLE,
            "Created default development subject with a well-known passphrase"
        );
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::Instant;
    use tokio::sync::oneshot;

    fn accounts() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()))
            .with_hasher(PassphraseHasher::with_params(8, 1, 1).unwrap())
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let accounts = accounts();
        let alice = accounts
            .register("alice", "alice@example.com", "p1")
            .await
            .unwrap();

        let again = accounts.authenticate("alice", "p1").await.unwrap();
        assert_eq!(again, alice);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let accounts = accounts();
        for (h, c, p) in [("", "c@x", "p"), ("h", " ", "p"), ("h", "c@x", "")] {
            assert!(matches!(
                accounts.register(h, c, p).await,
                Err(AccountError::MissingFields)
            ));
        }
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict_and_keeps_one() {
        let accounts = accounts();
        accounts.register("alice", "a@x.test", "p1").await.unwrap();

        assert!(matches!(
            accounts.register("alice", "other@x.test", "p2").await,
            Err(AccountError::Conflict)
        ));
        assert_eq!(accounts.store.count().await.unwrap(), 1);

        // The original passphrase still works
        assert!(accounts.authenticate("alice", "p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_passphrase_and_unknown_handle_look_the_same() {
        let accounts = accounts();
        accounts.register("alice", "a@x.test", "p1").await.unwrap();

        let wrong = accounts.authenticate("alice", "nope").await.unwrap_err();
        let unknown = accounts.authenticate("nobody", "p1").await.unwrap_err();

        assert!(matches!(wrong, AccountError::InvalidCredentials));
        assert!(matches!(unknown, AccountError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_unknown_handle_costs_a_verification() {
        // Costly enough that skipping the verification would stand out
        let accounts = CredentialStore::new(Arc::new(MemoryStore::new()))
            .with_hasher(PassphraseHasher::with_params(4096, 2, 1).unwrap());
        accounts.register("alice", "a@x.test", "p1").await.unwrap();

        // First miss also builds the decoy digest
        let _ = accounts.authenticate("nobody", "p1").await;

        let rounds = 5;
        let started = Instant::now();
        for _ in 0..rounds {
            let _ = accounts.authenticate("alice", "nope").await;
        }
        let wrong = started.elapsed() / rounds;

        let started = Instant::now();
        for _ in 0..rounds {
            let _ = accounts.authenticate("nobody", "p1").await;
        }
        let unknown = started.elapsed() / rounds;

        assert!(
            unknown * 3 >= wrong,
            "unknown handle {unknown:?} vs wrong passphrase {wrong:?}"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_runtime_free() {
        let accounts = CredentialStore::new(Arc::new(MemoryStore::new()))
            .with_hasher(PassphraseHasher::with_params(4096, 2, 1).unwrap());
        accounts.register("alice", "a@x.test", "p1").await.unwrap();

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(Instant::now());
        });

        accounts.authenticate("alice", "p1").await.unwrap();
        let finished = Instant::now();

        // The other task got to run while the passphrase was being checked
        let other_ran = rx.await.unwrap();
        assert!(other_ran < finished);
    }

    #[tokio::test]
    async fn test_lookup() {
        let accounts = accounts();
        let alice = accounts.register("alice", "a@x.test", "p1").await.unwrap();

        assert_eq!(accounts.lookup(alice.id).await.unwrap(), alice);
        assert!(matches!(
            accounts.lookup(999).await,
            Err(AccountError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_only_in_dev_mode_on_empty_store() {
        let accounts = accounts();
        assert!(accounts.bootstrap(false).await.unwrap().is_none());
        assert_eq!(accounts.store.count().await.unwrap(), 0);

        let admin = accounts.bootstrap(true).await.unwrap().unwrap();
        assert_eq!(admin.handle, DEV_ADMIN_HANDLE);
        assert_eq!(admin.contact, DEV_ADMIN_CONTACT);
        assert!(accounts
            .authenticate(DEV_ADMIN_HANDLE, DEV_ADMIN_PASSPHRASE)
            .await
            .is_ok());

        // Second call is a no-op
        assert!(accounts.bootstrap(true).await.unwrap().is_none());
        assert_eq!(accounts.store.count().await.unwrap(), 1);
    }
}
