use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::domain::error::DomainError;

/// Hash a raw password into an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::password_hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a raw password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch; a stored hash that fails to parse is an
/// internal error, not a credential failure.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, DomainError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| DomainError::password_hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
