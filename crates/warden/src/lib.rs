//! # Warden
//!
//! **Claims-based permission authorization for Rust HTTP services**
//!
//! Warden attaches a caller's permissions to its identity and checks each
//! operation against a declared AND/OR requirement:
//!
//! - **Identity augmentation**: the caller's `sub` claim is resolved through a
//!   [`PermissionLookup`](authz::PermissionLookup) service and every granted
//!   permission becomes a `permissions` claim
//! - **Requirement evaluation**: `and:create,update` needs every permission,
//!   `or:create,read` needs at least one
//! - **Fail closed**: a missing subject, an unknown subject, a lookup error,
//!   a timeout or a cancelled request all deny
//! - **Observability**: structured logs, Prometheus counters and OTLP spans
//!   for every augmentation and decision
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use warden::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("warden.toml")?
//!     .with_env_prefix("WARDEN")
//!     .load()?;
//!
//! let _telemetry = init_telemetry(&config.telemetry.to_telemetry_config())?;
//! let warden = Warden::builder(config).build()?;
//!
//! // For every request, once the host's router has resolved the operation:
//! let response = warden.handle(request, Some("getCurrentUser"), claims_handler).await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Authentication → Permissions → Authorization → Handler
//!                                 │               │
//!                          lookup service   requirement bound
//!                                            to the operation
//! ```

#![doc(html_root_url = "https://docs.rs/warden/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod handlers;

pub use engine::{Warden, WardenBuilder};
pub use handlers::claims_handler;

// Re-export core types
pub use warden_core as core;

// Re-export authorization types
pub use warden_authz as authz;

// Re-export middleware types
pub use warden_middleware as middleware;

// Re-export telemetry
pub use warden_telemetry as telemetry;

// Re-export configuration
pub use warden_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use warden::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{claims_handler, Warden, WardenBuilder};

    pub use warden_core::{
        claim_types, Claim, ClaimSet, ClaimsIdentity, Permission, PermissionSet, Principal,
        SubjectId, WardenError,
    };

    pub use warden_authz::{
        Decision, DecisionObserver, InMemoryPermissionStore, LookupError, PermissionLookup,
        PermissionOperator, PermissionRequirement, PolicyRegistry, RequirementEvaluator,
    };

    pub use warden_middleware::{
        MiddlewareContext, Pipeline, Request, Response, ResponseExt,
    };

    pub use warden_telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard};

    pub use warden_config::{ConfigError, ConfigLoader, WardenConfig};
}
