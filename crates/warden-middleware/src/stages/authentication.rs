//! Authentication stage.
//!
//! Token validation happens upstream: an authenticating proxy (or an outer
//! layer of the host) verifies the caller's credentials and forwards the
//! resulting claims in a trusted header as a JSON array of wire claims:
//!
//! ```text
//! x-authenticated-claims: [{"type":"sub","value":"alice"},{"type":"email","value":"alice@example.com"}]
//! ```
//!
//! This stage turns that header into an authenticated [`Principal`]. A
//! request without the header, or with an unreadable one, continues as
//! anonymous; later stages decide what anonymous callers may do.
//!
//! Only deploy this stage behind a proxy that strips the header from
//! client traffic. `permissions` claims in the header are dropped: they are
//! only ever attached by the permissions stage, from the lookup service.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use warden_core::{claim_types, Claim, ClaimSet, ClaimsIdentity, Principal};

/// Default header carrying upstream claims.
pub const AUTHENTICATED_CLAIMS_HEADER: &str = "x-authenticated-claims";

/// Default authentication type recorded on the installed identity.
pub const DEFAULT_AUTHENTICATION_TYPE: &str = "Bearer";

/// Middleware that installs the principal from trusted upstream claims.
#[derive(Debug, Clone)]
pub struct AuthenticationMiddleware {
    header: String,
    authentication_type: String,
}

impl AuthenticationMiddleware {
    /// Creates the stage reading [`AUTHENTICATED_CLAIMS_HEADER`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: AUTHENTICATED_CLAIMS_HEADER.to_string(),
            authentication_type: DEFAULT_AUTHENTICATION_TYPE.to_string(),
        }
    }

    /// Reads claims from a different header.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into().to_ascii_lowercase();
        self
    }

    /// Records a different authentication type on the identity.
    #[must_use]
    pub fn with_authentication_type(mut self, authentication_type: impl Into<String>) -> Self {
        self.authentication_type = authentication_type.into();
        self
    }

    /// Returns the header this stage reads.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    fn extract_principal(&self, request: &Request) -> Option<Principal> {
        let raw = request.headers().get(self.header.as_str())?;
        let text = match raw.to_str() {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!(header = %self.header, "claims header is not valid UTF-8");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Claim>>(text) {
            Ok(claims) => {
                let total = claims.len();
                let claims: ClaimSet = claims
                    .into_iter()
                    .filter(|claim| claim.claim_type != claim_types::PERMISSIONS)
                    .collect();
                if claims.len() < total {
                    tracing::warn!(
                        header = %self.header,
                        "ignoring upstream permissions claims"
                    );
                }
                Some(Principal::from_identity(ClaimsIdentity::authenticated(
                    self.authentication_type.clone(),
                    claims,
                )))
            }
            Err(err) => {
                tracing::warn!(
                    header = %self.header,
                    error = %err,
                    "claims header is not a claim array"
                );
                None
            }
        }
    }
}

impl Default for AuthenticationMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for AuthenticationMiddleware {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let principal = self
                .extract_principal(&request)
                .unwrap_or_else(Principal::anonymous);

            tracing::debug!(
                request_id = %ctx.request_id(),
                caller = %principal.log_id(),
                "principal resolved"
            );
            ctx.set_principal(principal);

            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    fn request_with(header: Option<(&str, &str)>) -> Request {
        let mut builder = http::Request::builder().uri("/users/me");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    async fn run(middleware: &AuthenticationMiddleware, request: Request) -> MiddlewareContext {
        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|_ctx, _req| {
            Box::pin(async { Response::json_bytes(StatusCode::OK, "{}") })
        });
        middleware.process(&mut ctx, request, next).await;
        ctx
    }

    #[tokio::test]
    async fn test_claims_header_authenticates() {
        let request = request_with(Some((
            AUTHENTICATED_CLAIMS_HEADER,
            r#"[{"type":"sub","value":"alice"},{"type":"email","value":"alice@example.com"}]"#,
        )));
        let ctx = run(&AuthenticationMiddleware::new(), request).await;

        assert!(ctx.principal().is_authenticated());
        assert_eq!(ctx.principal().find_first(claim_types::SUBJECT), Some("alice"));
        assert_eq!(
            ctx.principal().primary_identity().unwrap().authentication_type.as_deref(),
            Some("Bearer")
        );
    }

    #[tokio::test]
    async fn test_upstream_permissions_are_dropped() {
        let request = request_with(Some((
            AUTHENTICATED_CLAIMS_HEADER,
            r#"[{"type":"sub","value":"bob"},{"type":"permissions","value":"delete"}]"#,
        )));
        let ctx = run(&AuthenticationMiddleware::new(), request).await;

        assert_eq!(ctx.principal().find_first(claim_types::SUBJECT), Some("bob"));
        assert!(!ctx.principal().has_claim(claim_types::PERMISSIONS, "delete"));
        assert_eq!(ctx.principal().claims().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let ctx = run(&AuthenticationMiddleware::new(), request_with(None)).await;
        assert!(!ctx.principal().is_authenticated());
    }

    #[tokio::test]
    async fn test_malformed_header_is_anonymous() {
        let request = request_with(Some((AUTHENTICATED_CLAIMS_HEADER, "sub=alice")));
        let ctx = run(&AuthenticationMiddleware::new(), request).await;
        assert!(!ctx.principal().is_authenticated());
    }

    #[tokio::test]
    async fn test_custom_header() {
        let middleware = AuthenticationMiddleware::new()
            .with_header("X-Upstream-Claims")
            .with_authentication_type("mTLS");
        let claims = r#"[{"type":"sub","value":"svc"}]"#;
        let request = request_with(Some(("x-upstream-claims", claims)));
        let ctx = run(&middleware, request).await;

        assert_eq!(middleware.header(), "x-upstream-claims");
        assert_eq!(ctx.principal().log_id(), "sub:svc");
    }
}
