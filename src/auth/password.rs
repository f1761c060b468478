//! Credential Store
//! Mission: Hash and verify user secrets without ever keeping plaintext

use anyhow::{Context, Result};

/// Matches the work factor the database was seeded with.
const BCRYPT_COST: u32 = 12;

/// Hash a plaintext secret with bcrypt. Failure here is catastrophic
/// (library/entropy failure), not something callers are expected to recover
/// from.
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, BCRYPT_COST).context("failed to hash password")
}

/// Verify a candidate secret against a stored digest.
///
/// Returns `Ok(false)` for a well-formed mismatch and an error only for a
/// corrupt digest. bcrypt performs its own constant-time comparison.
pub fn verify_password(candidate: &str, digest: &str) -> Result<bool> {
    bcrypt::verify(candidate, digest).context("corrupt password digest")
}
