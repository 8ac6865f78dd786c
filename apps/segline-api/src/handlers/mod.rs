//! Request handlers

pub mod segments;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use segline_domain::SegmentError;
use tracing::{error, warn};

use crate::dto::segments::ErrorResponse;

/// Map a domain error to its status code and `{error}` body
pub fn error_response(err: SegmentError) -> Response {
    let status = match &err {
        SegmentError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SegmentError::NotFound(_) => StatusCode::NOT_FOUND,
        SegmentError::Conflict(_) => StatusCode::CONFLICT,
        SegmentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = %err, "Segment operation failed");
    } else {
        warn!(error = %err, status = status.as_u16(), "Segment operation rejected");
    }

    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}

/// Reject a request whose body or query could not be decoded
pub fn bad_request(reason: impl ToString) -> Response {
    let error = reason.to_string();
    warn!(error = %error, "Malformed request");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}
