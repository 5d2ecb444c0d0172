//! Locally generated responses.
//!
//! # Design Decisions
//! - Upstream connection failures are the only error the proxy produces itself
//! - Fixed 500 status with a plain-text body naming status and cause
//! - Upstream HTTP error statuses never pass through here; they are streamed

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

/// Status used for every upstream connection failure.
pub const UPSTREAM_ERROR_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// Plain-text error response: `Error <status>: <text>\n`.
pub fn error_response(status: StatusCode, text: &str) -> Response<Body> {
    let body = format!("Error {}: {}\n", status.as_u16(), text);
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Response for a failed upstream connection.
pub fn upstream_error(err: &dyn std::error::Error) -> Response<Body> {
    error_response(UPSTREAM_ERROR_STATUS, &err.to_string())
}
