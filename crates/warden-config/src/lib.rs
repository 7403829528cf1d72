//! Typed configuration for Warden.
//!
//! - TOML and JSON files
//! - Environment variable overrides (`WARDEN__SECTION__KEY`)
//! - Strict parsing (unknown fields are rejected)
//! - Named policies and operation bindings checked at load time, so a
//!   malformed requirement or a dangling binding stops startup instead of
//!   surfacing on a request
//!
//! # Configuration File Format
//!
//! ```toml
//! [telemetry]
//! service_name = "orders-api"
//! environment = "production"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [telemetry.logging]
//! level = "info,warden_authz=debug"
//! format = "json"
//!
//! [authentication]
//! claims_header = "x-authenticated-claims"
//!
//! [permissions]
//! lookup_timeout_ms = 2000
//!
//! [policies]
//! "orders.write" = "and:create,update"
//! "orders.read" = "or:read,create"
//!
//! [operations]
//! createOrder = "orders.write"
//! getOrder = "orders.read"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
