use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a password with bcrypt at the given cost. Every call uses a fresh salt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

/// Checks a password against a stored bcrypt hash.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
