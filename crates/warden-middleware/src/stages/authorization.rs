//! Authorization middleware stage.
//!
//! Enforces the permission requirement bound to the request's operation.
//! Bindings are declared at startup, either directly or by naming a policy
//! from a [`PolicyRegistry`]; a binding to an unknown policy fails at
//! construction, never at request time.
//!
//! # Pipeline Position
//!
//! Authorization runs after permissions have been attached:
//!
//! ```text
//! Request → Authentication → Permissions → [Authorization] → Handler
//! ```
//!
//! Operations without a binding are not checked here.
//!
//! # Example
//!
//! ```
//! use warden_authz::{PermissionRequirement, PolicyRegistry, RequirementEvaluator};
//! use warden_middleware::stages::AuthorizationMiddleware;
//!
//! let mut registry = PolicyRegistry::new();
//! registry.register("orders.write", "and:create,update".parse().unwrap()).unwrap();
//!
//! let middleware = AuthorizationMiddleware::from_registry(
//!     RequirementEvaluator::new(),
//!     &registry,
//!     [("createOrder", "orders.write")],
//! )
//! .unwrap()
//! .require("listOrders", PermissionRequirement::any(["read"]).unwrap());
//!
//! assert!(middleware.requirement_for("createOrder").is_some());
//! assert!(middleware.requirement_for("health").is_none());
//!
//! let unknown = AuthorizationMiddleware::from_registry(
//!     RequirementEvaluator::new(),
//!     &registry,
//!     [("deleteOrder", "orders.delete")],
//! );
//! assert!(unknown.is_err());
//! ```

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use std::collections::HashMap;
use std::sync::Arc;
use warden_authz::{
    AuthzResult, Decision, PermissionRequirement, PolicyRegistry, RequirementEvaluator,
};
use warden_core::WardenError;

/// Message returned when a requirement is not met.
pub const AUTHORIZATION_DENIED_MESSAGE: &str = "Access denied";

/// Authorization middleware evaluating per-operation requirements.
#[derive(Debug, Clone)]
pub struct AuthorizationMiddleware {
    evaluator: RequirementEvaluator,
    bindings: HashMap<String, Arc<PermissionRequirement>>,
}

impl AuthorizationMiddleware {
    /// Creates a middleware with no bindings.
    #[must_use]
    pub fn new(evaluator: RequirementEvaluator) -> Self {
        Self {
            evaluator,
            bindings: HashMap::new(),
        }
    }

    /// Creates a middleware binding operations to registered policies.
    ///
    /// Fails if any binding names an unregistered policy.
    pub fn from_registry<I, O, P>(
        evaluator: RequirementEvaluator,
        registry: &PolicyRegistry,
        bindings: I,
    ) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = (O, P)>,
        O: Into<String>,
        P: AsRef<str>,
    {
        let mut middleware = Self::new(evaluator);
        for (operation_id, policy) in bindings {
            let requirement = registry.get(policy.as_ref())?;
            middleware.bindings.insert(operation_id.into(), requirement);
        }
        Ok(middleware)
    }

    /// Binds a requirement to an operation, replacing any earlier binding.
    #[must_use]
    pub fn require(
        mut self,
        operation_id: impl Into<String>,
        requirement: PermissionRequirement,
    ) -> Self {
        self.bindings
            .insert(operation_id.into(), Arc::new(requirement));
        self
    }

    /// Returns the requirement bound to an operation.
    #[must_use]
    pub fn requirement_for(&self, operation_id: &str) -> Option<&PermissionRequirement> {
        self.bindings.get(operation_id).map(AsRef::as_ref)
    }

    /// Number of bound operations.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

impl Middleware for AuthorizationMiddleware {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let Some(operation_id) = ctx.operation_id().map(ToString::to_string) else {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    "no operation id, skipping authorization"
                );
                return next.run(ctx, request).await;
            };

            let Some(requirement) = self.bindings.get(&operation_id).cloned() else {
                return next.run(ctx, request).await;
            };

            let decision = self.evaluator.evaluate_operation(
                Some(&operation_id),
                &requirement,
                &ctx.principal().claims(),
            );

            let allowed = decision.is_admit();
            ctx.set_extension(AuthorizationResult {
                allowed,
                operation_id: operation_id.clone(),
                decision,
            });

            if allowed {
                next.run(ctx, request).await
            } else {
                let request_id = ctx.request_id().to_string();
                Response::from_error(
                    &WardenError::authorization_for_operation(
                        AUTHORIZATION_DENIED_MESSAGE,
                        operation_id,
                    ),
                    Some(&request_id),
                )
            }
        })
    }
}

/// Authorization result stored in context for auditing.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    /// Whether the request was allowed.
    pub allowed: bool,
    /// The operation that was evaluated.
    pub operation_id: String,
    /// The full decision, including what was missing on denial.
    pub decision: Decision,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::{BodyExt, Full};
    use warden_authz::DenyReason;
    use warden_core::{claim_types, ClaimSet, ClaimsIdentity, Permission, Principal};

    fn context(operation_id: Option<&str>, permissions: &[&str]) -> MiddlewareContext {
        let mut ctx = MiddlewareContext::new();
        if let Some(op) = operation_id {
            ctx.set_operation_id(op);
        }
        let mut claims = ClaimSet::new();
        claims.insert(claim_types::SUBJECT, "bob");
        let mut principal =
            Principal::from_identity(ClaimsIdentity::authenticated("Bearer", claims));

        let mut granted = ClaimSet::new();
        for permission in permissions {
            granted.insert(claim_types::PERMISSIONS, *permission);
        }
        principal.add_identity(ClaimsIdentity::unauthenticated(granted));
        ctx.set_principal(principal);
        ctx
    }

    fn middleware() -> AuthorizationMiddleware {
        AuthorizationMiddleware::new(RequirementEvaluator::new())
            .require("createUser", PermissionRequirement::all(["create", "read"]).unwrap())
            .require("getUser", PermissionRequirement::any(["create", "read"]).unwrap())
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/users")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| Box::pin(async { Response::json_bytes(StatusCode::OK, "{}") }))
    }

    #[tokio::test]
    async fn test_and_requirement_denied() {
        let mut ctx = context(Some("createUser"), &["read"]);
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "AUTHORIZATION_DENIED");
        assert_eq!(json["error"]["message"], "Access denied");

        let result = ctx.get_extension::<AuthorizationResult>().unwrap();
        assert!(!result.allowed);
        assert_eq!(
            result.decision,
            Decision::Deny(DenyReason::MissingPermission(Permission::from("create")))
        );
    }

    #[tokio::test]
    async fn test_or_requirement_admitted() {
        let mut ctx = context(Some("getUser"), &["read"]);
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.get_extension::<AuthorizationResult>().unwrap().allowed);
    }

    #[tokio::test]
    async fn test_unbound_operation_passes() {
        let mut ctx = context(Some("health"), &[]);
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!ctx.has_extension::<AuthorizationResult>());

        let mut ctx = context(None, &[]);
        let response = middleware().process(&mut ctx, request(), ok_handler()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
