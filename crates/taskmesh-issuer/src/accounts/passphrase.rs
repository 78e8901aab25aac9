//! Passphrase digests
//!
//! Argon2id with a fresh random salt per digest, stored as a PHC string.

use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Passphrase behind the decoy digest; never registered
const DECOY_PASSPHRASE: &str = "taskmesh-decoy-passphrase";

/// Hashes and checks passphrases
///
/// Argon2 is CPU-bound; async callers should run these methods on a
/// blocking thread.
#[derive(Clone)]
pub struct PassphraseHasher {
    argon2: Argon2<'static>,
    /// Digest under the same parameters, checked when a handle is unknown
    decoy: Arc<OnceLock<String>>,
}

impl std::fmt::Debug for PassphraseHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseHasher").finish_non_exhaustive()
    }
}

impl Default for PassphraseHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            decoy: Arc::default(),
        }
    }
}

impl PassphraseHasher {
    /// Argon2id with explicit cost parameters
    ///
    /// `memory_kib` is the memory cost in KiB, `iterations` the time cost.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: Arc::default(),
        })
    }

    /// Digest a passphrase into a PHC string
    pub fn hash(&self, passphrase: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(passphrase.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    }

    /// Check a passphrase against a stored PHC string
    ///
    /// A digest that cannot be parsed never matches.
    pub fn verify(&self, passphrase: &str, digest: &str) -> bool {
        PasswordHash::new(digest)
            .map(|parsed| {
                self.argon2
                    .verify_password(passphrase.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Spend the cost of one [`verify`](Self::verify) without a stored digest
    ///
    /// Always `false`. Lets a lookup miss take as long as a wrong passphrase.
    pub fn verify_decoy(&self, passphrase: &str) -> bool {
        let decoy = self
            .decoy
            .get_or_init(|| self.hash(DECOY_PASSPHRASE).unwrap_or_default());
        self.verify(passphrase, decoy);
        false
    }
}
