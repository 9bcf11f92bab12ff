//! Password hashing behind two small functions.
//!
//! Argon2id with the library's default parameters and per-hash random salt.
//! Callers never see the algorithm; swapping parameters only touches this
//! module.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

/// Hashing failed; treated as an internal fault by callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Hash a plaintext password into a PHC-format string.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError {
            message: err.to_string(),
        })
}

/// Check a plaintext password against a stored PHC-format hash.
///
/// An unparseable stored hash verifies as false rather than erroring: the
/// caller cannot distinguish it from a wrong password, which is the correct
/// behaviour for a login path.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_then_verify_accepts_correct_password() {
        let hash = hash_password("correct horse").expect("hashes");
        assert!(verify_password("correct horse", &hash));
    }

    #[rstest]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct horse").expect("hashes");
        assert!(!verify_password("battery staple", &hash));
    }

    #[rstest]
    fn verify_rejects_malformed_stored_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let first = hash_password("same input").expect("hashes");
        let second = hash_password("same input").expect("hashes");
        assert_ne!(first, second);
    }
}
