//! Consistent JSON error responses.
//!
//! Two wire shapes exist on this API: `{"error": ...}` for credential,
//! authorization, and store failures, and `{"message": ...}` on the
//! Google-login validation path.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::store::StoreError;

pub fn error_body(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn message_body(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "message": message.into() }))).into_response()
}

/// Map store failures: uniqueness violations are client faults, everything
/// else is a server fault.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::EmailTaken => error_body(
            StatusCode::BAD_REQUEST,
            "A user with this email already exists",
        ),
        StoreError::Backend(e) => {
            tracing::error!(error = %e, "identity store failure");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}
