//! Result and feedback endpoints for the logged-in student.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::auth::{session::load_session, types::MessageResponse};
use crate::{
    api::state::PortalState,
    results::{FeedbackBlock, ResultBlock},
};

const NO_RESULTS_MESSAGE: &str = "No test results found.";
const NO_FEEDBACK_MESSAGE: &str = "No feedback found.";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResultsResponse {
    /// The logged-in PRN.
    pub prn: String,
    pub results: Vec<ResultBlock>,
    /// Set when there is nothing to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FeedbackResponse {
    pub prn: String,
    pub feedback: Vec<FeedbackBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn empty_message<T>(blocks: &[T], message: &str) -> Option<String> {
    blocks.is_empty().then(|| message.to_string())
}

#[utoipa::path(
    get,
    path = "/v1/results",
    responses(
        (status = 200, description = "Every graded test with scores", body = ResultsResponse),
        (status = 401, description = "Not logged in", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse)
    ),
    tag = "results"
)]
#[instrument(skip_all)]
pub async fn results(headers: HeaderMap, state: Extension<Arc<PortalState>>) -> impl IntoResponse {
    let session = load_session(&headers, &state).await;
    match state.viewer().view_results(&session).await {
        Ok(results) => {
            let response = ResultsResponse {
                prn: session.identifier().to_string(),
                message: empty_message(&results, NO_RESULTS_MESSAGE),
                results,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/feedback",
    responses(
        (status = 200, description = "Every graded test, evaluations only", body = FeedbackResponse),
        (status = 401, description = "Not logged in", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse)
    ),
    tag = "results"
)]
#[instrument(skip_all)]
pub async fn feedback(headers: HeaderMap, state: Extension<Arc<PortalState>>) -> impl IntoResponse {
    let session = load_session(&headers, &state).await;
    match state.viewer().view_feedback(&session).await {
        Ok(feedback) => {
            let response = FeedbackResponse {
                prn: session.identifier().to_string(),
                message: empty_message(&feedback, NO_FEEDBACK_MESSAGE),
                feedback,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
