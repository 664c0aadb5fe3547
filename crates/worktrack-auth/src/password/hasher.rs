//! Argon2id password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use worktrack_core::error::AppError;

/// Throwaway hash checked when a login names no account.
static ABSENT_ACCOUNT_HASH: OnceLock<String> = OnceLock::new();

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Runs one verification against a throwaway hash, for logins that
    /// match no account, so they cost as much as a wrong password.
    pub fn verify_absent(&self, password: &str) -> Result<(), AppError> {
        let hash = match ABSENT_ACCOUNT_HASH.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash_password("worktrack:absent-account")?;
                ABSENT_ACCOUNT_HASH.get_or_init(|| hash)
            }
        };
        self.verify_password(password, hash)?;
        Ok(())
    }
}
