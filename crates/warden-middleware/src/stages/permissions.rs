//! Permissions stage.
//!
//! Runs the [`IdentityAugmenter`] for every request. Anonymous callers pass
//! through untouched; authenticated callers either get their permissions
//! attached or the request is rejected with `403 ACCESS_DENIED`.
//!
//! # Pipeline Position
//!
//! ```text
//! Request → Authentication → [Permissions] → Authorization → Handler
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use warden_authz::{AugmentOutcome, IdentityAugmenter};

/// Augmentation result stored in context for auditing.
#[derive(Debug, Clone)]
pub struct AugmentationResult {
    /// Whether the request was allowed to continue.
    pub allowed: bool,
    /// The full outcome.
    pub outcome: AugmentOutcome,
}

/// Middleware attaching the caller's permissions.
#[derive(Debug, Clone)]
pub struct PermissionsMiddleware {
    augmenter: IdentityAugmenter,
}

impl PermissionsMiddleware {
    /// Creates the stage around an augmenter.
    #[must_use]
    pub const fn new(augmenter: IdentityAugmenter) -> Self {
        Self { augmenter }
    }
}

impl Middleware for PermissionsMiddleware {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let cancel = ctx.cancellation_token().clone();
            let outcome = self.augmenter.augment(ctx.principal_mut(), &cancel).await;

            let rejection = outcome.denial().map(|denial| {
                let request_id = ctx.request_id().to_string();
                Response::from_error(&denial.to_error(), Some(&request_id))
            });

            ctx.set_extension(AugmentationResult {
                allowed: rejection.is_none(),
                outcome,
            });

            match rejection {
                Some(response) => response,
                None => next.run(ctx, request).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::{BodyExt, Full};
    use std::sync::Arc;
    use warden_authz::InMemoryPermissionStore;
    use warden_core::{claim_types, ClaimSet, ClaimsIdentity, Principal};

    fn middleware() -> PermissionsMiddleware {
        PermissionsMiddleware::new(IdentityAugmenter::new(Arc::new(
            InMemoryPermissionStore::with_demo_grants(),
        )))
    }

    fn context_for(sub: Option<&str>) -> MiddlewareContext {
        let mut ctx = MiddlewareContext::new();
        let mut claims = ClaimSet::new();
        if let Some(sub) = sub {
            claims.insert(claim_types::SUBJECT, sub);
        }
        ctx.set_principal(Principal::from_identity(ClaimsIdentity::authenticated(
            "Bearer", claims,
        )));
        ctx
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| Box::pin(async { Response::json_bytes(StatusCode::OK, "{}") }))
    }

    #[tokio::test]
    async fn test_augmented_request_continues() {
        let mut ctx = context_for(Some("bob"));
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.principal().has_claim(claim_types::PERMISSIONS, "read"));
        assert!(ctx.get_extension::<AugmentationResult>().unwrap().allowed);
    }

    #[tokio::test]
    async fn test_missing_sub_rejected_with_diagnostic() {
        let mut ctx = context_for(None);
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "ACCESS_DENIED");
        assert_eq!(json["error"]["message"], "User 'sub' claim is required");

        let result = ctx.get_extension::<AugmentationResult>().unwrap();
        assert!(!result.allowed);
        assert_eq!(result.outcome.label(), "missing_subject");
    }

    #[tokio::test]
    async fn test_unknown_subject_rejected_generically() {
        let mut ctx = context_for(Some("carol"));
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Access denied");
    }

    #[tokio::test]
    async fn test_anonymous_passes() {
        let mut ctx = MiddlewareContext::new();
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<AugmentationResult>().unwrap().outcome,
            AugmentOutcome::PassThrough
        );
    }
}
