//! Ready-made handlers.

use http::StatusCode;
use serde::Serialize;
use warden_core::WardenError;
use warden_middleware::{BoxFuture, MiddlewareContext, Request, Response, ResponseExt};

/// Renders the caller's claims as a JSON array of `{"type", "value"}`.
///
/// Mounted behind the pipeline, the output includes the `permissions`
/// claims attached during augmentation.
pub fn claims_handler(
    ctx: &mut MiddlewareContext,
    _request: Request,
) -> BoxFuture<'static, Response> {
    let response = json_response(&ctx.principal().wire_claims(), &ctx.request_id().to_string());
    Box::pin(async move { response })
}

/// Serializes `body` into a 200 response, or an internal error envelope.
fn json_response<T: Serialize + ?Sized>(body: &T, request_id: &str) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::json_bytes(StatusCode::OK, bytes),
        Err(e) => {
            let error =
                WardenError::internal_with_source("failed to serialize response body", e);
            tracing::error!(request_id, error = %error, "handler failed");
            Response::from_error(&error, Some(request_id))
        }
    }
}
