//! Common types used throughout the middleware pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use warden_core::WardenError;

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a JSON response from raw bytes.
    fn json_bytes(status: StatusCode, body: impl Into<Bytes>) -> Response;

    /// Creates a JSON error response with the `{"error": {"code", "message"}}` shape.
    fn json_error(status: StatusCode, code: &str, message: &str) -> Response;

    /// Renders a [`WardenError`] into its envelope, using the error's own status.
    fn from_error(error: &WardenError, request_id: Option<&str>) -> Response;
}

impl ResponseExt for Response {
    fn json_bytes(status: StatusCode, body: impl Into<Bytes>) -> Response {
        let mut response = http::Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        Self::json_bytes(status, body.to_string())
    }

    fn from_error(error: &WardenError, request_id: Option<&str>) -> Response {
        let envelope = error.to_envelope(request_id);
        match serde_json::to_vec(&envelope) {
            Ok(body) => Self::json_bytes(error.status_code(), body),
            Err(_) => Self::json_error(
                error.status_code(),
                error.error_code(),
                error.public_message(),
            ),
        }
    }
}
