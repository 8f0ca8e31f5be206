//! Credential and result stores.
//!
//! The portal reads and writes two collections: student identities
//! (`student_metadata`) and graded test results (`student_scores`). Both are
//! reached through the [`CredentialStore`] and [`ResultStore`] traits so the
//! auth and view logic can run against Postgres in production and against
//! [`MemoryStore`] in tests.
//!
//! Identifiers handed to a store are already normalized (see
//! [`crate::auth::normalize_identifier`]); stores still compare
//! case-insensitively because result rows keep whatever case the grading
//! pipeline wrote.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid schema statement: {0}")]
    Schema(String),
}

/// A registered student. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    pub identifier: String,
    pub display_name: String,
    /// Argon2id hash in PHC string format.
    pub secret_hash: String,
}

/// One graded answer inside a [`TestResult`].
///
/// Grader rows may omit fields or write `null`; either reads as empty so one
/// sparse answer never hides the rest of the test.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    /// Score out of 5, `None` when the grader left it blank.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evaluation: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A graded test as written by the grading pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub identifier: String,
    pub test_id: String,
    pub student_name: Option<String>,
    pub total_marks: f64,
    pub max_marks: f64,
    pub results: Vec<QuestionResult>,
}

/// Outcome of inserting a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// The identifier is already registered (unique constraint hit).
    Conflict,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an identity by normalized identifier.
    async fn find_identity(&self, identifier: &str) -> Result<Option<StudentIdentity>, StoreError>;

    /// Insert a new identity; uniqueness is enforced by the store itself.
    async fn insert_identity(
        &self,
        identity: &StudentIdentity,
    ) -> Result<InsertOutcome, StoreError>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// All results whose identifier matches case-insensitively, in storage
    /// insertion order.
    async fn find_results(&self, identifier: &str) -> Result<Vec<TestResult>, StoreError>;
}

/// A backend that carries both collections.
#[async_trait]
pub trait Store: CredentialStore + ResultStore {
    fn backend_tag(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
