//! Fixed-order middleware pipeline.
//!
//! ## Pipeline Stages
//!
//! 1. **Authentication** - Install the caller's principal from trusted upstream claims
//! 2. **Permissions** - Attach the subject's permissions, or deny
//! 3. **Authorization** - Evaluate the operation's permission requirement, or deny
//!
//! Permissions must run before authorization: evaluation reads the
//! augmented claim set. [`Pipeline::authorization`] builds a pipeline with
//! exactly this order.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{AuthenticationMiddleware, AuthorizationMiddleware, PermissionsMiddleware};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The middleware pipeline.
///
/// The stage list cannot be modified after construction.
///
/// # Example
///
/// ```ignore
/// use warden_middleware::pipeline::Pipeline;
///
/// let pipeline = Pipeline::authorization(authentication, permissions, authorization);
/// let response = pipeline.process(ctx, request, handler).await;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Builds the standard three-stage pipeline in its fixed order.
    #[must_use]
    pub fn authorization(
        authentication: AuthenticationMiddleware,
        permissions: PermissionsMiddleware,
        authorization: AuthorizationMiddleware,
    ) -> Self {
        Self::builder()
            .add_stage(authentication)
            .add_stage(permissions)
            .add_stage(authorization)
            .build()
    }

    /// Processes a request through every stage, then the handler.
    ///
    /// The handler only runs if no stage short-circuited.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        self.run(&mut ctx, request, handler).await
    }

    /// Like [`Pipeline::process`], but leaves the context with the caller so
    /// extensions written by the stages can be inspected afterwards.
    pub async fn run<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Stages run in insertion order.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The fixed stages of the authorization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: principal from trusted upstream claims
    Authentication = 1,
    /// Stage 2: identity augmentation
    Permissions = 2,
    /// Stage 3: requirement evaluation
    Authorization = 3,
}

impl Stage {
    /// Returns the stage name, matching [`Middleware::name`] of its middleware.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Permissions => "permissions",
            Self::Authorization => "authorization",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::Authentication, Self::Permissions, Self::Authorization]
    }
}
