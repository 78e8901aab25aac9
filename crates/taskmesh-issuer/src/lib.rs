//! Issuer Server
//!
//! The issuer is the only holder of the signing secret. It:
//! - Registers subjects and stores a salted digest of their passphrase
//! - Mints 24-hour credentials on login and registration
//! - Verifies credentials for resource services
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /api/auth/login` - Exchange handle and passphrase for a credential
//! - `POST /api/auth/register` - Create a subject and mint its first credential
//! - `GET /api/auth/validate` - Verify the bearer credential
//! - `GET /api/auth/user` - Current record of the bearer's subject

pub mod accounts;
pub mod api;
pub mod config;
pub mod core;
pub mod storage;

use std::sync::Arc;

pub use accounts::{AccountError, CredentialStore, PassphraseHasher};
pub use api::create_router;
pub use api::handlers::AppState;
pub use config::IssuerConfig;
pub use core::{IssuedCredential, Issuer, IssuerError};
pub use storage::{MemoryStore, StorageError, SubjectStore};

/// Open the subject store named by `database_url`
///
/// `None` selects the in-memory store.
pub async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn SubjectStore>, StorageError> {
    match database_url {
        None => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        Some(url) => Ok(Arc::new(storage::SqliteStore::connect(url).await?)),
        #[cfg(not(feature = "sqlite"))]
        Some(_) => Err(StorageError::Connection(
            "DATABASE_URL is set but this build has no `sqlite` feature".into(),
        )),
    }
}
