//! Credential verifier implementations

pub mod local;
pub mod remote;

pub use local::LocalVerifier;
pub use remote::{RemoteVerifier, DEFAULT_VERIFY_TIMEOUT};
