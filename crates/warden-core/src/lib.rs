//! # Warden Core
//!
//! Core types shared by every Warden crate.
//!
//! - [`Claim`] / [`ClaimSet`] - Wire claim pairs and the typed claim mapping
//! - [`ClaimsIdentity`] / [`Principal`] - Identities attached to a request
//! - [`SubjectId`] / [`Permission`] / [`PermissionSet`] - Authorization vocabulary
//! - [`RequestId`] - UUID v7 request identifier
//! - [`WardenError`] - Standard error type with an HTTP error envelope

#![doc(html_root_url = "https://docs.rs/warden-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod claims;
mod context;
mod error;
mod identity;
pub mod permission;

pub use claims::{claim_types, Claim, ClaimSet};
pub use context::RequestId;
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, WardenError, WardenResult};
pub use identity::{ClaimsIdentity, Principal};
pub use permission::{Permission, PermissionSet, SubjectId};

use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
///
/// Used at the async seams (lookup service, middleware) instead of
/// `async fn` in traits so the traits stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
