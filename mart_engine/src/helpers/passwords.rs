//! Credential hashing.
//!
//! Argon2id with a per-user random salt, stored as a PHC string. Verification
//! never reports why it failed; unknown login and wrong password are
//! indistinguishable to callers.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::traits::MartStoreError;

pub fn hash(password: &str) -> Result<String, MartStoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MartStoreError::Credential(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}
