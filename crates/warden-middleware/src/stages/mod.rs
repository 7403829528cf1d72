//! Authorization pipeline stages.
//!
//! 1. [`authentication`] - Principal from trusted upstream claims
//! 2. [`permissions`] - Identity augmentation
//! 3. [`authorization`] - Per-operation requirement evaluation

pub mod authentication;
pub mod authorization;
pub mod permissions;

// Re-export main types
pub use authentication::AuthenticationMiddleware;
pub use authorization::{AuthorizationMiddleware, AuthorizationResult};
pub use permissions::{AugmentationResult, PermissionsMiddleware};
