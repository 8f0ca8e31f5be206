//! Student signup, login, and logout.
//!
//! ## Identifiers
//!
//! A student's PRN is normalized (trimmed, uppercased) before every lookup and
//! insert, so `" prn001"` and `"PRN001"` name the same student.
//!
//! ## Failure reporting
//!
//! Login failures are deliberately undifferentiated: an unknown PRN and a wrong
//! password both yield [`AuthError::NotFoundOrInvalid`], so the response never
//! reveals whether a PRN is registered.

mod hasher;

pub use hasher::{HashError, SecretHasher};
#[cfg(test)]
pub(crate) use hasher::fast_hasher;

use crate::{
    session::Session,
    store::{CredentialStore, InsertOutcome, StoreError, StudentIdentity},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("All fields are required.")]
    Validation,
    #[error("Passwords do not match.")]
    Mismatch,
    #[error("PRN already exists. Please login.")]
    Duplicate,
    #[error("Invalid PRN or Password.")]
    NotFoundOrInvalid,
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Normalize a PRN for lookup and uniqueness checks.
#[must_use]
pub fn normalize_identifier(input: &str) -> String {
    input.trim().to_uppercase()
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    hasher: SecretHasher,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, hasher: SecretHasher) -> Self {
        Self {
            credentials,
            hasher,
        }
    }

    /// Register a new student.
    ///
    /// Checks run in order (required fields, confirmation, uniqueness) and stop
    /// at the first failure; nothing is written unless all pass.
    ///
    /// # Errors
    /// [`AuthError::Validation`], [`AuthError::Mismatch`], [`AuthError::Duplicate`],
    /// or an internal hashing/store error.
    #[instrument(skip(self, secret, confirm_secret))]
    pub async fn signup(
        &self,
        display_name: &str,
        identifier: &str,
        secret: &SecretString,
        confirm_secret: &SecretString,
    ) -> Result<StudentIdentity, AuthError> {
        let display_name = display_name.trim();
        let identifier = normalize_identifier(identifier);

        if display_name.is_empty()
            || identifier.is_empty()
            || secret.expose_secret().is_empty()
            || confirm_secret.expose_secret().is_empty()
        {
            return Err(AuthError::Validation);
        }

        if secret.expose_secret() != confirm_secret.expose_secret() {
            return Err(AuthError::Mismatch);
        }

        let hasher = self.hasher.clone();
        let plain = secret.expose_secret().to_owned();
        let secret_hash = tokio::task::spawn_blocking(move || hasher.hash(&plain)).await??;

        let identity = StudentIdentity {
            identifier,
            display_name: display_name.to_string(),
            secret_hash,
        };

        match self.credentials.insert_identity(&identity).await? {
            InsertOutcome::Created => {
                info!("Registered student {}", identity.identifier);
                Ok(identity)
            }
            InsertOutcome::Conflict => {
                debug!("PRN already registered");
                Err(AuthError::Duplicate)
            }
        }
    }

    /// Authenticate `session` as the student owning `identifier`.
    ///
    /// # Errors
    /// [`AuthError::NotFoundOrInvalid`] for an unknown PRN or a wrong secret,
    /// or an internal store error. The session is left untouched on failure.
    #[instrument(skip(self, session, secret))]
    pub async fn login(
        &self,
        session: &mut Session,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<(), AuthError> {
        let identifier = normalize_identifier(identifier);

        let Some(identity) = self.credentials.find_identity(&identifier).await? else {
            debug!("Unknown PRN");
            return Err(AuthError::NotFoundOrInvalid);
        };

        let hasher = self.hasher.clone();
        let plain = secret.expose_secret().to_owned();
        let stored_hash = identity.secret_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify(&plain, &stored_hash)).await?;

        match verified {
            Ok(true) => {
                session.authenticate(identity.identifier, identity.display_name);
                info!("Login successful");
                Ok(())
            }
            Ok(false) => {
                debug!("Secret mismatch");
                Err(AuthError::NotFoundOrInvalid)
            }
            Err(err) => {
                error!("Stored secret hash is unusable: {err}");
                Err(AuthError::NotFoundOrInvalid)
            }
        }
    }

    /// Clear `session`. Nothing persistent changes.
    pub fn logout(&self, session: &mut Session) {
        session.reset();
    }
}
