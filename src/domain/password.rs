//! Password value object - credential hashing and verification.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`):
//! algorithm tag, parameters, salt and derived key in one self-describing
//! value. Verification never errors; anything unparseable is a mismatch.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::domain::error::{DomainError, DomainResult};

/// Hash verified when a login names an unknown seller, so the response time
/// does not reveal which usernames exist.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$2lbBDQdSrfL4yLXXbTYQIRmmyd/4tMyLYrkl4JFgkAc";

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns [`DomainError::WeakPassword`] if the password is shorter than
    /// [`MIN_PASSWORD_LENGTH`] characters.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        Ok(Self {
            hash: hash_password(plain_text)?,
        })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        verify_password(plain_text, &self.hash)
    }
}

/// Derive a salted Argon2id hash of `plain_text`.
pub fn hash_password(plain_text: &str) -> DomainResult<String> {
    if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(plain_text.as_bytes(), &salt)
        .map_err(|e| DomainError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `plain_text` against a stored PHC hash.
///
/// Malformed strings, foreign algorithm tags and mismatches all yield
/// `false`. The derived-key comparison inside `argon2` is constant-time.
pub fn verify_password(plain_text: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    argon2()
        .verify_password(plain_text.as_bytes(), &parsed)
        .is_ok()
}

#[inline]
fn argon2() -> Argon2<'static> {
    Argon2::default()
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}
