//! Rendered dashboard pages.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::auth::{session::load_session, types::MessageResponse};
use crate::{api::state::PortalState, dashboard::View};

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

#[utoipa::path(
    get,
    path = "/v1/dashboard/{view}",
    params(
        ("view" = String, Path, description = "One of `login`, `results`, `feedback`")
    ),
    responses(
        (status = 200, description = "Rendered page", body = String, content_type = "text/markdown"),
        (status = 401, description = "Not logged in", body = MessageResponse),
        (status = 404, description = "Unknown view", body = MessageResponse)
    ),
    tag = "results"
)]
#[instrument(skip(headers, state))]
pub async fn dashboard(
    Path(view): Path<String>,
    headers: HeaderMap,
    state: Extension<Arc<PortalState>>,
) -> impl IntoResponse {
    let view = match view.parse::<View>() {
        Ok(view) => view,
        Err(err) => {
            debug!("{err}");
            return (
                StatusCode::NOT_FOUND,
                Json(MessageResponse {
                    message: err.to_string(),
                }),
            )
                .into_response();
        }
    };

    let session = load_session(&headers, &state).await;
    match state.dashboard().render(view, &session).await {
        Ok(page) => (StatusCode::OK, [(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], page).into_response(),
        Err(err) => err.into_response(),
    }
}
