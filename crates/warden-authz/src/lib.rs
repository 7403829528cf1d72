//! Warden Authorization - claims-based permission checks
//!
//! This crate holds the authorization engine: attaching a subject's
//! permissions to its principal, and evaluating AND/OR permission
//! requirements against the result.
//!
//! # Overview
//!
//! ```text
//!                       ┌────────────────────────────┐
//!                       │   PermissionLookup         │
//!                       │   (store, cache, service)  │
//!                       └──────────┬─────────────────┘
//!                                  │ permissions(sub)
//!                       ┌──────────▼─────────────────┐
//!   Principal ─────────►│   IdentityAugmenter        │──► Denied (403)
//!                       └──────────┬─────────────────┘
//!                                  │ principal + permissions identity
//!                       ┌──────────▼─────────────────┐
//!   PermissionRequirement ─────►   RequirementEvaluator   │──► Decision
//!                       └────────────────────────────┘
//!                                  │ reports
//!                       ┌──────────▼─────────────────┐
//!                       │   DecisionObserver         │
//!                       └────────────────────────────┘
//! ```
//!
//! The augmenter and evaluator only decide. Logging and metrics are the
//! job of a [`DecisionObserver`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use warden_authz::{
//!     Decision, IdentityAugmenter, InMemoryPermissionStore, PermissionRequirement,
//!     RequirementEvaluator,
//! };
//! use warden_core::{claim_types, ClaimSet, ClaimsIdentity, Principal};
//!
//! # tokio_test::block_on(async {
//! let augmenter = IdentityAugmenter::new(Arc::new(InMemoryPermissionStore::with_demo_grants()));
//! let evaluator = RequirementEvaluator::new();
//!
//! let mut claims = ClaimSet::new();
//! claims.insert(claim_types::SUBJECT, "alice");
//! let mut principal = Principal::from_identity(ClaimsIdentity::authenticated("Bearer", claims));
//!
//! augmenter.augment(&mut principal, &CancellationToken::new()).await;
//!
//! let requirement = PermissionRequirement::all(["create", "update"]).unwrap();
//! assert_eq!(evaluator.evaluate_principal(&requirement, &principal), Decision::Admit);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod augmenter;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod lookup;
pub mod observer;
pub mod policy;
pub mod requirement;
pub mod store;

#[cfg(test)]
mod span_capture;

// Re-exports for convenience
pub use augmenter::{AugmentDenial, AugmentOutcome, IdentityAugmenter};
pub use decision::{evaluate, Decision, DenyReason};
pub use error::{AuthzError, AuthzResult};
pub use evaluator::RequirementEvaluator;
pub use lookup::{LookupError, PermissionLookup, TimeoutLookup};
pub use observer::{
    AugmentationReport, DecisionObserver, EvaluationReport, NoopObserver, ObservedDecision,
    RecordingObserver,
};
pub use policy::PolicyRegistry;
pub use requirement::{PermissionOperator, PermissionRequirement};
pub use store::InMemoryPermissionStore;
