//! Student login: verifies credentials and issues a session cookie.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    session::{extract_session_token, session_cookie},
    types::{LoginRequest, LoginResponse, MessageResponse},
};
use crate::api::state::PortalState;

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid PRN or password", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all, fields(prn = %request.prn))]
pub async fn login(
    headers: HeaderMap,
    state: Extension<Arc<PortalState>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let presented = extract_session_token(&headers);
    let mut session = state.sessions().load(presented.as_deref()).await;

    if let Err(err) = state
        .auth()
        .login(&mut session, &request.prn, &request.password)
        .await
    {
        return err.into_response();
    }

    // A new login replaces whatever session the caller presented.
    if let Some(previous) = presented.as_deref() {
        state.sessions().revoke(previous).await;
    }

    let token = match state.sessions().issue(session.clone()).await {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue session: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(state.config(), &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            state.sessions().revoke(&token).await;
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let response = LoginResponse {
        message: format!("Welcome, {}! Login successful.", session.display_name()),
        prn: session.identifier().to_string(),
        student_name: session.display_name().to_string(),
    };
    (StatusCode::OK, response_headers, Json(response)).into_response()
}
