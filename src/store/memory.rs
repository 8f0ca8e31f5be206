//! In-process store used by tests and local runs without a database.

use super::{
    CredentialStore, InsertOutcome, ResultStore, Store, StoreError, StudentIdentity, TestResult,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    identities: RwLock<Vec<StudentIdentity>>,
    results: RwLock<Vec<TestResult>>,
    result_reads: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a graded result, as the grading pipeline would.
    pub async fn insert_result(&self, result: TestResult) {
        self.results.write().await.push(result);
    }

    /// Number of times the result collection has been queried.
    pub fn result_reads(&self) -> u64 {
        self.result_reads.load(Ordering::Relaxed)
    }

    pub async fn identity_count(&self) -> usize {
        self.identities.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_identity(&self, identifier: &str) -> Result<Option<StudentIdentity>, StoreError> {
        let wanted = identifier.to_uppercase();
        Ok(self
            .identities
            .read()
            .await
            .iter()
            .find(|identity| identity.identifier.to_uppercase() == wanted)
            .cloned())
    }

    async fn insert_identity(
        &self,
        identity: &StudentIdentity,
    ) -> Result<InsertOutcome, StoreError> {
        // Check and insert under one write lock, mirroring a unique index.
        let mut identities = self.identities.write().await;
        let wanted = identity.identifier.to_uppercase();
        if identities
            .iter()
            .any(|existing| existing.identifier.to_uppercase() == wanted)
        {
            return Ok(InsertOutcome::Conflict);
        }
        identities.push(identity.clone());
        Ok(InsertOutcome::Created)
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn find_results(&self, identifier: &str) -> Result<Vec<TestResult>, StoreError> {
        self.result_reads.fetch_add(1, Ordering::Relaxed);
        let wanted = identifier.to_uppercase();
        Ok(self
            .results
            .read()
            .await
            .iter()
            .filter(|result| result.identifier.to_uppercase() == wanted)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
