//! Wiring configuration, a lookup service and telemetry into a pipeline.

use std::sync::Arc;
use warden_authz::{
    DecisionObserver, IdentityAugmenter, InMemoryPermissionStore, PermissionLookup,
    PolicyRegistry, RequirementEvaluator, TimeoutLookup,
};
use warden_config::{ConfigError, WardenConfig};
use warden_middleware::stages::{
    AuthenticationMiddleware, AuthorizationMiddleware, PermissionsMiddleware,
};
use warden_middleware::{BoxFuture, MiddlewareContext, Pipeline, Request, Response};
use warden_telemetry::TelemetryObserver;

/// A ready-to-use authorization pipeline.
///
/// Built once at startup and shared across requests; every request gets
/// its own [`MiddlewareContext`].
///
/// # Example
///
/// ```rust,ignore
/// use warden::{claims_handler, Warden, WardenConfig};
///
/// let warden = Warden::builder(WardenConfig::development()).build()?;
/// let response = warden.handle(request, Some("getCurrentUser"), claims_handler).await;
/// ```
pub struct Warden {
    pipeline: Pipeline,
    registry: PolicyRegistry,
    config: WardenConfig,
}

impl Warden {
    /// Starts building from a configuration.
    #[must_use]
    pub fn builder(config: WardenConfig) -> WardenBuilder {
        WardenBuilder::new(config)
    }

    /// Runs a request through the pipeline.
    ///
    /// `operation_id` is the operation the host's router resolved for the
    /// request; `None` skips requirement evaluation. Dropping the returned
    /// future cancels the token handed to the permission lookup.
    pub async fn handle<H>(
        &self,
        request: Request,
        operation_id: Option<&str>,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let mut ctx = MiddlewareContext::for_request(&request);
        if let Some(operation_id) = operation_id {
            ctx.set_operation_id(operation_id);
        }
        self.pipeline.run(&mut ctx, request, handler).await
    }

    /// Runs a request with a caller-supplied context.
    ///
    /// Use this to tie the request to the host's cancellation token.
    pub async fn handle_with_context<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        self.pipeline.run(ctx, request, handler).await
    }

    /// The underlying pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The registered policies.
    #[must_use]
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// The configuration the pipeline was built from.
    #[must_use]
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }
}

impl std::fmt::Debug for Warden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("pipeline", &self.pipeline)
            .field("policies", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Warden`].
pub struct WardenBuilder {
    config: WardenConfig,
    lookup: Option<Arc<dyn PermissionLookup>>,
    observer: Option<Arc<dyn DecisionObserver>>,
}

impl WardenBuilder {
    fn new(config: WardenConfig) -> Self {
        Self {
            config,
            lookup: None,
            observer: None,
        }
    }

    /// Sets the permission lookup service.
    ///
    /// Without one, an in-memory store is used, seeded with the demo grants
    /// when `permissions.seed_demo_grants` is set.
    #[must_use]
    pub fn lookup(mut self, lookup: Arc<dyn PermissionLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Replaces the default [`TelemetryObserver`].
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validates the configuration and assembles the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails or an operation is bound
    /// to an unregistered policy.
    pub fn build(self) -> Result<Warden, ConfigError> {
        let config = self.config;
        config.validate()?;

        let registry = config.policy_registry()?;

        let lookup: Arc<dyn PermissionLookup> = match self.lookup {
            Some(lookup) => lookup,
            None if config.permissions.seed_demo_grants => {
                Arc::new(InMemoryPermissionStore::with_demo_grants())
            }
            None => Arc::new(InMemoryPermissionStore::new()),
        };
        let lookup = TimeoutLookup::new(lookup, config.permissions.lookup_timeout());

        let observer: Arc<dyn DecisionObserver> = match self.observer {
            Some(observer) => observer,
            None => Arc::new(TelemetryObserver::new()),
        };

        let authentication = AuthenticationMiddleware::new()
            .with_header(config.authentication.claims_header.clone())
            .with_authentication_type(config.authentication.authentication_type.clone());

        let augmenter = IdentityAugmenter::new(Arc::new(lookup)).with_observer(observer.clone());

        let authorization = AuthorizationMiddleware::from_registry(
            RequirementEvaluator::new().with_observer(observer),
            &registry,
            &config.operations,
        )?;

        tracing::info!(
            policies = registry.len(),
            bound_operations = authorization.binding_count(),
            claims_header = %config.authentication.claims_header,
            "authorization pipeline ready"
        );

        Ok(Warden {
            pipeline: Pipeline::authorization(
                authentication,
                PermissionsMiddleware::new(augmenter),
                authorization,
            ),
            registry,
            config,
        })
    }
}

impl std::fmt::Debug for WardenBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WardenBuilder")
            .field("custom_lookup", &self.lookup.is_some())
            .field("custom_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
