//! Core logic for the issuer

mod issuer;

pub use issuer::{IssuedCredential, Issuer, IssuerError};
