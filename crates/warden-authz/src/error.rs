//! Error types for the authorization crate.
//!
//! These are declaration-time errors: they surface while requirements and
//! policies are being built at startup. Request-time failures never use
//! them; they resolve to a [`Decision`](crate::Decision) or an
//! [`AugmentOutcome`](crate::AugmentOutcome) instead.

use thiserror::Error;

/// Result type for authorization declarations.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Errors raised while declaring requirements and policies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthzError {
    /// A requirement was declared without any permission.
    #[error("permission requirement must name at least one permission")]
    EmptyRequirement,

    /// A textual requirement could not be parsed.
    #[error("invalid permission requirement '{input}': {reason}")]
    InvalidRequirement {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two policies were registered under the same name.
    #[error("policy '{0}' is already registered")]
    DuplicatePolicy(String),

    /// A policy name was referenced but never registered.
    #[error("policy '{0}' is not registered")]
    UnknownPolicy(String),
}

impl AuthzError {
    /// Create an invalid requirement error.
    pub fn invalid_requirement(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequirement {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
