//! Salted one-way hashing for student secrets.
//!
//! Secrets are hashed with Argon2id and stored as PHC strings, so the salt and
//! cost parameters travel with the hash and verification never needs config.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
    #[error("failed to hash secret: {0}")]
    Hash(String),
    #[error("stored hash is not a valid PHC string")]
    Malformed,
}

#[derive(Debug, Clone)]
pub struct SecretHasher {
    params: Params,
}

impl SecretHasher {
    /// Build a hasher with explicit Argon2id costs (memory in KiB).
    ///
    /// # Errors
    /// Returns an error if the costs are outside what Argon2 accepts.
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|err| HashError::Params(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a secret with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, secret: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| HashError::Hash(err.to_string()))
    }

    /// Check a secret against a stored PHC hash.
    ///
    /// # Errors
    /// Returns [`HashError::Malformed`] if the stored hash cannot be parsed.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|_| HashError::Malformed)?;
        Ok(self
            .argon2()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> SecretHasher {
    // Minimum Argon2 costs keep unit tests quick.
    SecretHasher {
        params: Params::new(Params::MIN_M_COST, 1, 1, None).unwrap_or_default(),
    }
}
