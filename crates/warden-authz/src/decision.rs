//! Authorization decisions.
//!
//! [`evaluate`] is the pure core of requirement evaluation: no I/O, no
//! telemetry, no shared state. [`RequirementEvaluator`](crate::RequirementEvaluator)
//! wraps it with spans and observer notifications.

use crate::requirement::PermissionRequirement;
use serde::{Deserialize, Serialize};
use std::fmt;
use warden_core::{claim_types, ClaimSet, Permission};

/// Why a requirement was not satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "permissions")]
pub enum DenyReason {
    /// AND requirement: the first permission, in declaration order, that was absent.
    MissingPermission(Permission),
    /// OR requirement: none of these permissions were present.
    NoneOfRequired(Vec<Permission>),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPermission(permission) => {
                write!(f, "missing required permission '{permission}'")
            }
            Self::NoneOfRequired(permissions) => {
                let names: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
                write!(f, "none of the required permissions held: {}", names.join(","))
            }
        }
    }
}

/// Outcome of evaluating a requirement against a claim set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The requirement is satisfied.
    Admit,
    /// The requirement is not satisfied.
    Deny(DenyReason),
}

impl Decision {
    /// Returns `true` for [`Decision::Admit`].
    #[must_use]
    pub const fn is_admit(&self) -> bool {
        matches!(self, Self::Admit)
    }

    /// Metric label for this decision: `authorized` or `unauthorized`.
    #[must_use]
    pub const fn result_label(&self) -> &'static str {
        match self {
            Self::Admit => "authorized",
            Self::Deny(_) => "unauthorized",
        }
    }

    /// Returns the deny reason, if any.
    #[must_use]
    pub const fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Admit => None,
            Self::Deny(reason) => Some(reason),
        }
    }
}

/// Evaluates a requirement against a claim set.
///
/// Only claims of type `permissions` count, matched by exact value.
///
/// # Example
///
/// ```
/// use warden_authz::{evaluate, Decision, DenyReason, PermissionRequirement};
/// use warden_core::{claim_types, ClaimSet, Permission};
///
/// let mut claims = ClaimSet::new();
/// claims.insert(claim_types::PERMISSIONS, "read");
///
/// let requirement = PermissionRequirement::all(["create", "read"]).unwrap();
/// assert_eq!(
///     evaluate(&requirement, &claims),
///     Decision::Deny(DenyReason::MissingPermission(Permission::from("create")))
/// );
/// ```
#[must_use]
pub fn evaluate(requirement: &PermissionRequirement, claims: &ClaimSet) -> Decision {
    let held =
        |permission: &Permission| claims.contains(claim_types::PERMISSIONS, permission.as_str());

    match requirement {
        PermissionRequirement::And(permissions) => {
            match permissions.iter().find(|&permission| !held(permission)) {
                Some(missing) => Decision::Deny(DenyReason::MissingPermission(missing.clone())),
                None => Decision::Admit,
            }
        }
        PermissionRequirement::Or(permissions) => {
            if permissions.iter().any(held) {
                Decision::Admit
            } else {
                Decision::Deny(DenyReason::NoneOfRequired(permissions.clone()))
            }
        }
    }
}
