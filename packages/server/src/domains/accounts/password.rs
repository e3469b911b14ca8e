//! Salted password digests.
//!
//! Each user row stores a random hex salt alongside a SHA-256 digest of
//! `salt || password`. Comparison re-derives the digest from the candidate
//! password and the stored salt.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a fresh random salt (32 hex chars).
pub fn generate_salt() -> String {
    hex::encode(Uuid::new_v4().as_bytes())
}

/// Hash a password with the given salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a candidate password against a stored salt and digest.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}
