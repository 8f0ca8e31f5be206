//! Result and feedback retrieval for the logged-in student.
//!
//! Both views are gated on an authenticated [`Session`]; an unauthenticated
//! call fails before the result store is queried. Blocks come back ordered by
//! `test_id`, ties kept in storage insertion order.

use crate::{
    auth::normalize_identifier,
    session::Session,
    store::{ResultStore, StoreError, TestResult},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Results,
    Feedback,
}

impl ViewKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Results => "results",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Please log in to view {0}.")]
    Unauthenticated(ViewKind),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoredQuestion {
    pub question: String,
    /// Out of 5, absent when the grader left it blank.
    pub score: Option<f64>,
    pub evaluation: String,
}

/// One graded test with every question, score, and evaluation.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultBlock {
    pub test_id: String,
    pub student_name: Option<String>,
    pub total_marks: f64,
    pub max_marks: f64,
    pub questions: Vec<ScoredQuestion>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItem {
    pub question: String,
    pub evaluation: String,
}

/// One graded test reduced to questions and evaluations.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackBlock {
    pub test_id: String,
    pub items: Vec<FeedbackItem>,
}

impl From<TestResult> for ResultBlock {
    fn from(result: TestResult) -> Self {
        Self {
            test_id: result.test_id,
            student_name: result.student_name,
            total_marks: result.total_marks,
            max_marks: result.max_marks,
            questions: result
                .results
                .into_iter()
                .map(|q| ScoredQuestion {
                    question: q.question,
                    score: q.score,
                    evaluation: q.evaluation,
                })
                .collect(),
        }
    }
}

impl From<TestResult> for FeedbackBlock {
    fn from(result: TestResult) -> Self {
        Self {
            test_id: result.test_id,
            items: result
                .results
                .into_iter()
                .map(|q| FeedbackItem {
                    question: q.question,
                    evaluation: q.evaluation,
                })
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct ResultViewer {
    results: Arc<dyn ResultStore>,
}

impl fmt::Debug for ResultViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultViewer").finish_non_exhaustive()
    }
}

impl ResultViewer {
    #[must_use]
    pub fn new(results: Arc<dyn ResultStore>) -> Self {
        Self { results }
    }

    /// Every graded test for the session's student, with scores.
    ///
    /// # Errors
    /// [`ViewError::Unauthenticated`] without touching the store, or a store error.
    #[instrument(skip_all, fields(identifier = session.identifier()))]
    pub async fn view_results(&self, session: &Session) -> Result<Vec<ResultBlock>, ViewError> {
        let results = self.fetch(session, ViewKind::Results).await?;
        Ok(results.into_iter().map(ResultBlock::from).collect())
    }

    /// Every graded test for the session's student, evaluations only.
    ///
    /// # Errors
    /// [`ViewError::Unauthenticated`] without touching the store, or a store error.
    #[instrument(skip_all, fields(identifier = session.identifier()))]
    pub async fn view_feedback(&self, session: &Session) -> Result<Vec<FeedbackBlock>, ViewError> {
        let results = self.fetch(session, ViewKind::Feedback).await?;
        Ok(results.into_iter().map(FeedbackBlock::from).collect())
    }

    async fn fetch(&self, session: &Session, kind: ViewKind) -> Result<Vec<TestResult>, ViewError> {
        if !session.is_authenticated() {
            debug!("Rejecting unauthenticated {kind} request");
            return Err(ViewError::Unauthenticated(kind));
        }

        let identifier = normalize_identifier(session.identifier());
        let mut results = self.results.find_results(&identifier).await?;
        // Stable sort keeps insertion order between equal test ids.
        results.sort_by(|a, b| a.test_id.cmp(&b.test_id));
        debug!("Found {} {kind} record(s)", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, QuestionResult};
    use anyhow::Result;

    fn question(text: &str, score: f64, evaluation: &str) -> QuestionResult {
        QuestionResult {
            question: text.to_string(),
            score: Some(score),
            evaluation: evaluation.to_string(),
        }
    }

    fn test_result(identifier: &str, test_id: &str, questions: Vec<QuestionResult>) -> TestResult {
        TestResult {
            identifier: identifier.to_string(),
            test_id: test_id.to_string(),
            student_name: Some("Asha Rao".to_string()),
            total_marks: questions.iter().filter_map(|q| q.score).sum(),
            max_marks: 5.0 * questions.len() as f64,
            results: questions,
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_result(test_result(
                "prn001",
                "T2",
                vec![question("Define entropy.", 4.0, "Mostly correct.")],
            ))
            .await;
        store
            .insert_result(test_result(
                "PRN002",
                "T1",
                vec![question("Other student", 1.0, "Not yours.")],
            ))
            .await;
        store
            .insert_result(test_result(
                "PRN001",
                "T1",
                vec![
                    question("What is a mutex?", 5.0, "Excellent."),
                    question("What is a semaphore?", 3.0, "Partially correct."),
                ],
            ))
            .await;
        store
    }

    #[tokio::test]
    async fn unauthenticated_views_never_touch_the_store() {
        let store = seeded_store().await;
        let viewer = ResultViewer::new(store.clone());
        let session = Session::new();

        assert!(matches!(
            viewer.view_results(&session).await,
            Err(ViewError::Unauthenticated(ViewKind::Results))
        ));
        assert!(matches!(
            viewer.view_feedback(&session).await,
            Err(ViewError::Unauthenticated(ViewKind::Feedback))
        ));
        assert_eq!(store.result_reads(), 0);
    }

    #[tokio::test]
    async fn view_results_returns_one_block_per_test() -> Result<()> {
        let viewer = ResultViewer::new(seeded_store().await);
        let session = Session::authenticated("PRN001", "Asha Rao");

        let blocks = viewer.view_results(&session).await?;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].test_id, "T1");
        assert_eq!(blocks[0].questions.len(), 2);
        assert_eq!(blocks[0].total_marks, 8.0);
        assert_eq!(blocks[1].test_id, "T2");
        assert_eq!(blocks[1].questions.len(), 1);
        assert_eq!(blocks[1].questions[0].score, Some(4.0));
        Ok(())
    }

    #[tokio::test]
    async fn view_results_is_stable_across_calls() -> Result<()> {
        let viewer = ResultViewer::new(seeded_store().await);
        let session = Session::authenticated("PRN001", "Asha Rao");
        let first = viewer.view_results(&session).await?;
        let second = viewer.view_results(&session).await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn equal_test_ids_keep_insertion_order() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_result(test_result("PRN001", "T1", vec![question("first", 1.0, "a")]))
            .await;
        store
            .insert_result(test_result("PRN001", "T0", vec![question("zero", 1.0, "z")]))
            .await;
        store
            .insert_result(test_result("PRN001", "T1", vec![question("second", 2.0, "b")]))
            .await;
        let viewer = ResultViewer::new(store);

        let blocks = viewer
            .view_results(&Session::authenticated("PRN001", "Asha Rao"))
            .await?;
        let order: Vec<&str> = blocks
            .iter()
            .map(|b| b.questions[0].question.as_str())
            .collect();
        assert_eq!(order, vec!["zero", "first", "second"]);
        Ok(())
    }

    #[tokio::test]
    async fn view_feedback_drops_scores() -> Result<()> {
        let viewer = ResultViewer::new(seeded_store().await);
        let session = Session::authenticated("prn001", "Asha Rao");

        let blocks = viewer.view_feedback(&session).await?;
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].items[1],
            FeedbackItem {
                question: "What is a semaphore?".to_string(),
                evaluation: "Partially correct.".to_string(),
            }
        );
        let json = serde_json::to_value(&blocks[0])?;
        assert!(json.get("items").is_some());
        assert!(!json.to_string().contains("score"));
        Ok(())
    }

    #[tokio::test]
    async fn student_without_results_gets_empty_list() -> Result<()> {
        let viewer = ResultViewer::new(seeded_store().await);
        let blocks = viewer
            .view_results(&Session::authenticated("PRN999", "Nobody"))
            .await?;
        assert!(blocks.is_empty());
        Ok(())
    }

    #[test]
    fn unauthenticated_message_names_the_view() {
        assert_eq!(
            ViewError::Unauthenticated(ViewKind::Results).to_string(),
            "Please log in to view results."
        );
        assert_eq!(
            ViewError::Unauthenticated(ViewKind::Feedback).to_string(),
            "Please log in to view feedback."
        );
    }
}
