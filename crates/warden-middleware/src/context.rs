//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries per-request state through the pipeline:
//! the request id, the [`Principal`] (anonymous until the authentication
//! stage runs, augmented by the permissions stage), the operation id the
//! host resolved for the route, and the cancellation token tied to the
//! request's lifetime.
//!
//! A context is owned by exactly one request and is never shared. Dropping
//! it cancels its token, so work started on the token's behalf (a lookup
//! still in flight when the client disconnects) is told to stop.

use crate::types::Request;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use tokio_util::sync::{CancellationToken, DropGuard};
use warden_core::{Principal, RequestId};

/// Header carrying a propagated request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Context that flows through the middleware pipeline.
///
/// # Example
///
/// ```
/// use warden_core::{claim_types, ClaimSet, ClaimsIdentity, Principal};
/// use warden_middleware::context::MiddlewareContext;
///
/// let mut claims = ClaimSet::new();
/// claims.insert(claim_types::SUBJECT, "alice");
///
/// let mut ctx = MiddlewareContext::new().with_operation_id("getUser");
/// ctx.set_principal(Principal::from_identity(ClaimsIdentity::authenticated("Bearer", claims)));
///
/// assert!(ctx.principal().is_authenticated());
/// assert_eq!(ctx.operation_id(), Some("getUser"));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    principal: Principal,
    operation_id: Option<String>,
    cancellation: CancellationToken,
    _cancel_on_drop: DropGuard,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request id and an anonymous principal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request id.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        let cancellation = CancellationToken::new();
        Self {
            request_id,
            principal: Principal::anonymous(),
            operation_id: None,
            _cancel_on_drop: cancellation.clone().drop_guard(),
            cancellation,
            extensions: HashMap::new(),
        }
    }

    /// Creates a context for `request`, reusing a valid `x-request-id` header.
    #[must_use]
    pub fn for_request(request: &Request) -> Self {
        let propagated = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse);
        Self::with_request_id(propagated.unwrap_or_default())
    }

    /// Sets the operation id (builder form).
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Ties the context to a host cancellation token.
    ///
    /// Hosts pass the token they cancel when the client disconnects or the
    /// request times out. The context works on a child of `token`: cancelling
    /// `token` reaches the request, dropping the context does not cancel
    /// `token`.
    #[must_use]
    pub fn with_cancellation(self, token: &CancellationToken) -> Self {
        let child = token.child_token();
        Self {
            _cancel_on_drop: child.clone().drop_guard(),
            cancellation: child,
            ..self
        }
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the principal for in-place augmentation.
    pub fn principal_mut(&mut self) -> &mut Principal {
        &mut self.principal
    }

    /// Replaces the principal.
    ///
    /// This should only be called by the authentication stage.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = principal;
    }

    /// Returns the operation id, if resolved.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Sets the operation id.
    pub fn set_operation_id(&mut self, operation_id: impl Into<String>) {
        self.operation_id = Some(operation_id.into());
    }

    /// Returns the token cancelled when the request is aborted.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Stores a typed extension value, replacing any previous one of that type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    #[test]
    fn test_new_context_is_anonymous() {
        let ctx = MiddlewareContext::new();
        assert!(!ctx.principal().is_authenticated());
        assert!(ctx.operation_id().is_none());
        assert!(!ctx.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_request_id_propagation() {
        let id = RequestId::new();
        let request: Request = http::Request::builder()
            .header(REQUEST_ID_HEADER, id.to_string())
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(MiddlewareContext::for_request(&request).request_id(), id);

        let bogus: Request = http::Request::builder()
            .header(REQUEST_ID_HEADER, "not-a-uuid")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_ne!(MiddlewareContext::for_request(&bogus).request_id(), id);
    }

    #[test]
    fn test_host_cancellation_reaches_context() {
        let token = CancellationToken::new();
        let ctx = MiddlewareContext::new().with_cancellation(&token);
        token.cancel();
        assert!(ctx.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_dropping_context_cancels_its_token() {
        let ctx = MiddlewareContext::new();
        let token = ctx.cancellation_token().clone();
        assert!(!token.is_cancelled());
        drop(ctx);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_dropping_context_leaves_host_token_alone() {
        let host = CancellationToken::new();
        let ctx = MiddlewareContext::new().with_cancellation(&host);
        let request_token = ctx.cancellation_token().clone();
        drop(ctx);
        assert!(request_token.is_cancelled());
        assert!(!host.is_cancelled());
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Marker(u8);

        let mut ctx = MiddlewareContext::new();
        assert!(!ctx.has_extension::<Marker>());

        ctx.set_extension(Marker(7));
        assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker(7)));
        assert_eq!(ctx.remove_extension::<Marker>(), Some(Marker(7)));
        assert!(!ctx.has_extension::<Marker>());
    }
}
