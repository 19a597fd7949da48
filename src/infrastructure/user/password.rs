//! Argon2 password hashing

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use std::fmt::Debug;
use std::sync::LazyLock;

use crate::domain::DomainError;

/// Hash of a throwaway password, checked when a username is unknown so both
/// failure paths cost one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    Argon2Hasher::new()
        .hash("directory-dummy-password")
        .ok()
});

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password into a PHC string
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a PHC hash. Unparseable hashes never match.
    fn verify(&self, password: &str, hash: &str) -> bool;

    /// Burn one verification for a login against an unknown account
    fn verify_dummy(&self, password: &str) {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = self.verify(password, hash);
        }
    }
}

/// Argon2id hasher with the crate's default parameters
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                self.argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
