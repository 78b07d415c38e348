//! Error types for the occurrence API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! response body carries the `{success: false, message}` envelope the
//! dashboard expects; internal detail stays in the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sisocc_core::LifecycleError;
use sisocc_db::DbError;
use sisocc_geocode::GeocodeError;

/// Errors that can occur while serving an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request payload failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The acting-user header is missing or not a UUID.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent update won the version race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request body exceeded the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Address resolution failed under the strict policy.
    #[error("geocoding failed: {0}")]
    Geocoding(#[from] GeocodeError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LifecycleError> for ApiError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::NotFound(msg) => Self::NotFound(msg),
            LifecycleError::Conflict(msg) => Self::Conflict(msg),
            LifecycleError::Geocode(e) => Self::Geocoding(e),
            LifecycleError::Db(e) => Self::from(e),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        tracing::error!(error = %error, "database failure");
        Self::Internal(String::from("database failure"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            Self::Geocoding(e) => (StatusCode::BAD_REQUEST, format!("address not resolvable: {e}")),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "success": false,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn lifecycle_errors_map_to_api_variants() {
        let api: ApiError = LifecycleError::NotFound(String::from("occurrence x")).into();
        assert!(matches!(api, ApiError::NotFound(_)));

        let api: ApiError = LifecycleError::Conflict(String::from("stale")).into();
        assert!(matches!(api, ApiError::Conflict(_)));

        let api: ApiError = LifecycleError::Geocode(GeocodeError::NoMatch).into();
        assert!(matches!(api, ApiError::Geocoding(_)));
    }

    #[test]
    fn db_detail_is_not_exposed() {
        let api: ApiError = DbError::Decode(String::from("unknown status \"X\"")).into();
        let ApiError::Internal(message) = api else {
            panic!("expected internal error");
        };
        assert_eq!(message, "database failure");
    }
}
