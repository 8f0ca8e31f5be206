//! Student signup.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::instrument;

use super::types::{MessageResponse, SignupRequest};
use crate::api::state::PortalState;

pub(crate) const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful! Please login.";

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Student registered", body = MessageResponse),
        (status = 400, description = "Missing field or password mismatch", body = MessageResponse),
        (status = 409, description = "PRN already registered", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all, fields(prn = %request.prn))]
pub async fn signup(
    state: Extension<Arc<PortalState>>,
    Json(request): Json<SignupRequest>,
) -> impl IntoResponse {
    match state
        .auth()
        .signup(
            &request.name,
            &request.prn,
            &request.password,
            &request.confirm_password,
        )
        .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: SIGNUP_SUCCESS_MESSAGE.to_string(),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
