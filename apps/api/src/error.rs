// [apps/api/src/error.rs]
//! Maps `CoreError` onto HTTP status codes. This is the one place
//! in the workspace allowed to turn a domain error into a status
//! code — `CoreError`'s own doc comment names `apps/api` as that
//! boundary.

use aegis_domain_models::CoreError;
use aegis_infra_store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self(CoreError::from(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            CoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            CoreError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
            CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            CoreError::StaleSnapshot(_) => (StatusCode::CONFLICT, "STALE_SNAPSHOT"),
            CoreError::CapacityExceeded(_) => (StatusCode::CONFLICT, "CAPACITY_EXCEEDED"),
            CoreError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            // DEPENDENCY_UNAVAILABLE must never reach a caller on the
            // critical path; if one does leak this far it's a defect
            // upstream, not something to expose distinctly here.
            CoreError::DependencyUnavailable(_) | CoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        (status, Json(json!({ "error": code, "message": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
