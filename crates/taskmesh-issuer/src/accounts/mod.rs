//! Subject accounts: registration, authentication, lookup

pub mod passphrase;
pub mod store;

pub use passphrase::PassphraseHasher;
pub use store::{AccountError, CredentialStore, DEV_ADMIN_CONTACT, DEV_ADMIN_HANDLE, DEV_ADMIN_PASSPHRASE};
