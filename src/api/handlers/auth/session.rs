//! Session endpoints and cookie/bearer token plumbing.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::{MessageResponse, SessionResponse};
use crate::{
    api::state::{PortalConfig, PortalState},
    session::Session,
};

pub(crate) const SESSION_COOKIE_NAME: &str = "autograder_session";

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    state: Extension<Arc<PortalState>>,
) -> impl IntoResponse {
    // Missing or unknown tokens are reported as "no session".
    let session = load_session(&headers, &state).await;
    if !session.is_authenticated() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let response = SessionResponse {
        prn: session.identifier().to_string(),
        student_name: session.display_name().to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    headers: HeaderMap,
    state: Extension<Arc<PortalState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        let mut session = state.sessions().load(Some(&token)).await;
        state.auth().logout(&mut session);
        state.sessions().revoke(&token).await;
        debug!("Session revoked");
    }

    // Always clear the cookie, even if the session was already gone.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    let body = MessageResponse {
        message: "Logged out successfully.".to_string(),
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}

/// Resolve the request's session. Anything unresolvable is unauthenticated.
pub(crate) async fn load_session(headers: &HeaderMap, state: &PortalState) -> Session {
    let token = extract_session_token(headers);
    state.sessions().load(token.as_deref()).await
}

/// Build an `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    config: &PortalConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &PortalConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let value = headers.get(COOKIE)?.to_str().ok()?;
    for pair in value.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let key = parts.next().unwrap_or_default().trim();
        // Valueless cookies such as `consent` are skipped, not fatal.
        let Some(val) = parts.next().map(str::trim) else {
            continue;
        };
        if key == SESSION_COOKIE_NAME && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
