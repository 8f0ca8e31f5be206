//! HTTP mapping for domain errors.

use super::handlers::auth::types::MessageResponse;
use crate::{auth::AuthError, results::ViewError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

fn message(status: StatusCode, message: String) -> Response {
    (status, Json(MessageResponse { message })).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Validation | Self::Mismatch => StatusCode::BAD_REQUEST,
            Self::Duplicate => StatusCode::CONFLICT,
            Self::NotFoundOrInvalid => StatusCode::UNAUTHORIZED,
            Self::Hash(_) | Self::Task(_) | Self::Store(_) => {
                error!("Auth request failed: {self}");
                return message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                );
            }
        };
        message(status, self.to_string())
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(_) => message(StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Store(err) => {
                error!("Failed to load results: {err}");
                message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{results::ViewKind, store::StoreError};

    #[test]
    fn auth_errors_map_to_client_statuses() {
        assert_eq!(
            AuthError::Validation.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Mismatch.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Duplicate.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::NotFoundOrInvalid.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_failures_are_internal_errors() {
        let auth = AuthError::Store(StoreError::Schema("boom".to_string()));
        assert_eq!(
            auth.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let view = ViewError::Store(StoreError::Schema("boom".to_string()));
        assert_eq!(
            view.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthenticated_view_is_401() {
        let response = ViewError::Unauthenticated(ViewKind::Feedback).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
