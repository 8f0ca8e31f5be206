//! Dashboard controller: maps a menu selection to a rendered Markdown page.
//!
//! The results and feedback pages are gated by [`ResultViewer`]; an
//! unauthenticated session gets the error and no page at all.

use crate::{
    results::{FeedbackBlock, ResultBlock, ResultViewer, ViewError},
    session::Session,
};
use std::{fmt::Write as _, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    LoginSignup,
    ViewResults,
    ViewFeedback,
}

#[derive(Debug, Error)]
#[error("unknown dashboard view: {0}")]
pub struct UnknownView(String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Self::LoginSignup),
            "results" => Ok(Self::ViewResults),
            "feedback" => Ok(Self::ViewFeedback),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    viewer: ResultViewer,
}

impl Dashboard {
    #[must_use]
    pub fn new(viewer: ResultViewer) -> Self {
        Self { viewer }
    }

    /// Render `view` for `session` as Markdown.
    ///
    /// # Errors
    /// [`ViewError::Unauthenticated`] for a gated view without a login, or a
    /// store error.
    pub async fn render(&self, view: View, session: &Session) -> Result<String, ViewError> {
        match view {
            View::LoginSignup => Ok(render_login(session)),
            View::ViewResults => {
                let blocks = self.viewer.view_results(session).await?;
                Ok(render_results(session.identifier(), &blocks))
            }
            View::ViewFeedback => {
                let blocks = self.viewer.view_feedback(session).await?;
                Ok(render_feedback(session.identifier(), &blocks))
            }
        }
    }
}

fn test_id_or_na(test_id: &str) -> &str {
    if test_id.is_empty() { "N/A" } else { test_id }
}

fn render_login(session: &Session) -> String {
    let mut page = String::from("# Student Login/Signup\n\n");
    if session.is_authenticated() {
        let _ = writeln!(page, "## Welcome, {}!\n", session.display_name());
        page.push_str("Log out with `POST /v1/auth/logout`.\n");
    } else {
        page.push_str("Log in with `POST /v1/auth/login` (PRN, password).\n\n");
        page.push_str(
            "Create an account with `POST /v1/auth/signup` (full name, PRN, password, confirm password).\n",
        );
    }
    page
}

fn render_results(identifier: &str, blocks: &[ResultBlock]) -> String {
    let mut page = String::from("# View Test Results\n\n");
    let _ = writeln!(page, "Logged-in PRN: {identifier}\n");
    if blocks.is_empty() {
        page.push_str("No test results found.\n");
        return page;
    }

    for block in blocks {
        let _ = writeln!(page, "## Test ID: {}\n", test_id_or_na(&block.test_id));
        let _ = writeln!(
            page,
            "**Student Name:** {}\n",
            block.student_name.as_deref().unwrap_or("N/A")
        );
        let _ = writeln!(
            page,
            "**Total Marks:** {} / {}\n",
            block.total_marks, block.max_marks
        );
        for question in &block.questions {
            let _ = writeln!(page, "**Question:** {}\n", question.question);
            match question.score {
                Some(score) => {
                    let _ = writeln!(page, "**Score:** {score}/5\n");
                }
                None => page.push_str("**Score:** N/A\n\n"),
            }
            let _ = writeln!(page, "**Feedback:** {}\n", question.evaluation);
            page.push_str("---\n\n");
        }
    }
    page
}

fn render_feedback(identifier: &str, blocks: &[FeedbackBlock]) -> String {
    let mut page = String::from("# View Feedback\n\n");
    let _ = writeln!(page, "Logged-in PRN: {identifier}\n");
    if blocks.is_empty() {
        page.push_str("No feedback found.\n");
        return page;
    }

    for block in blocks {
        let _ = writeln!(page, "## Test ID: {}\n", test_id_or_na(&block.test_id));
        for item in &block.items {
            let _ = writeln!(page, "*Question:* {}\n", item.question);
            let _ = writeln!(page, "*Feedback:* {}\n", item.evaluation);
            page.push_str("---\n\n");
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, QuestionResult, TestResult};
    use anyhow::Result;
    use std::sync::Arc;

    async fn dashboard() -> (Arc<MemoryStore>, Dashboard) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_result(TestResult {
                identifier: "prn001".to_string(),
                test_id: "T1".to_string(),
                student_name: Some("Asha Rao".to_string()),
                total_marks: 4.5,
                max_marks: 5.0,
                results: vec![
                    QuestionResult {
                        question: "What is a mutex?".to_string(),
                        score: Some(4.5),
                        evaluation: "Clear answer.".to_string(),
                    },
                    QuestionResult {
                        question: "What is a semaphore?".to_string(),
                        score: None,
                        evaluation: "Not graded yet.".to_string(),
                    },
                ],
            })
            .await;
        store
            .insert_result(TestResult {
                identifier: "PRN001".to_string(),
                test_id: String::new(),
                student_name: None,
                total_marks: 0.0,
                max_marks: 0.0,
                results: Vec::new(),
            })
            .await;
        let dashboard = Dashboard::new(ResultViewer::new(store.clone()));
        (store, dashboard)
    }

    #[test]
    fn view_parses_menu_names() {
        assert_eq!("login".parse::<View>().ok(), Some(View::LoginSignup));
        assert_eq!("results".parse::<View>().ok(), Some(View::ViewResults));
        assert_eq!("feedback".parse::<View>().ok(), Some(View::ViewFeedback));
        assert!("grading".parse::<View>().is_err());
    }

    #[tokio::test]
    async fn gated_views_short_circuit_without_login() {
        let (store, dashboard) = dashboard().await;
        let session = Session::new();
        for view in [View::ViewResults, View::ViewFeedback] {
            let result = dashboard.render(view, &session).await;
            assert!(matches!(result, Err(ViewError::Unauthenticated(_))));
        }
        assert_eq!(store.result_reads(), 0);
    }

    #[tokio::test]
    async fn login_view_is_always_available() -> Result<()> {
        let (_store, dashboard) = dashboard().await;
        let anonymous = dashboard.render(View::LoginSignup, &Session::new()).await?;
        assert!(anonymous.contains("POST /v1/auth/login"));
        assert!(!anonymous.contains("Welcome"));

        let session = Session::authenticated("PRN001", "Asha Rao");
        let greeted = dashboard.render(View::LoginSignup, &session).await?;
        assert!(greeted.contains("## Welcome, Asha Rao!"));
        assert!(greeted.contains("POST /v1/auth/logout"));
        Ok(())
    }

    #[tokio::test]
    async fn results_page_lists_scores_and_placeholders() -> Result<()> {
        let (_store, dashboard) = dashboard().await;
        let session = Session::authenticated("PRN001", "Asha Rao");
        let page = dashboard.render(View::ViewResults, &session).await?;

        assert!(page.contains("Logged-in PRN: PRN001"));
        assert!(page.contains("## Test ID: N/A"));
        assert!(page.contains("## Test ID: T1"));
        assert!(page.contains("**Student Name:** N/A"));
        assert!(page.contains("**Total Marks:** 4.5 / 5"));
        assert!(page.contains("**Score:** 4.5/5"));
        assert!(page.contains("**Feedback:** Clear answer."));
        assert!(page.contains("**Score:** N/A"));
        assert!(page.contains("**Feedback:** Not graded yet."));
        // The placeholder block sorts first because its test id is empty.
        assert!(page.find("Test ID: N/A") < page.find("Test ID: T1"));
        Ok(())
    }

    #[tokio::test]
    async fn feedback_page_has_no_scores() -> Result<()> {
        let (_store, dashboard) = dashboard().await;
        let session = Session::authenticated("PRN001", "Asha Rao");
        let page = dashboard.render(View::ViewFeedback, &session).await?;
        assert!(page.contains("*Question:* What is a mutex?"));
        assert!(page.contains("*Feedback:* Clear answer."));
        assert!(!page.contains("Score"));
        assert!(!page.contains("Total Marks"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_views_show_informational_messages() -> Result<()> {
        let (_store, dashboard) = dashboard().await;
        let session = Session::authenticated("PRN404", "Nobody");
        let results = dashboard.render(View::ViewResults, &session).await?;
        assert!(results.contains("No test results found."));
        let feedback = dashboard.render(View::ViewFeedback, &session).await?;
        assert!(feedback.contains("No feedback found."));
        Ok(())
    }
}
