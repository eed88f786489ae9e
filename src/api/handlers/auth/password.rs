//! Password digest handling.
//!
//! Thin wrapper over Argon2id with its default (fixed) parameters. The rest of
//! the crate treats digests as opaque strings.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use tracing::warn;

/// Hash a plaintext password for storage, with a fresh random salt.
///
/// # Errors
///
/// Returns an error if the hashing primitive fails (effectively only on
/// resource exhaustion).
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?;
    Ok(digest.to_string())
}

/// Check a plaintext password against a stored digest.
///
/// A mismatch is a normal `false`, never an error. An unparseable digest is
/// also treated as a mismatch and logged; verification must not turn a corrupt
/// row into a success.
#[must_use]
pub fn matches(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        warn!("stored password digest could not be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
