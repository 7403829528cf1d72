//! Named policies.
//!
//! Requirements are usually declared once under a name (`users.write`) and
//! then bound to any number of operations. The registry is filled at
//! startup and only read afterwards.

use crate::error::{AuthzError, AuthzResult};
use crate::requirement::PermissionRequirement;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps policy names to requirements.
///
/// # Example
///
/// ```
/// use warden_authz::{PermissionRequirement, PolicyRegistry};
///
/// let mut registry = PolicyRegistry::new();
/// registry
///     .register("users.write", PermissionRequirement::all(["create", "update"]).unwrap())
///     .unwrap();
///
/// assert!(registry.get("users.write").is_ok());
/// assert!(registry.get("users.delete").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<String, Arc<PermissionRequirement>>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        requirement: PermissionRequirement,
    ) -> AuthzResult<()> {
        let name = name.into();
        if self.policies.contains_key(&name) {
            return Err(AuthzError::DuplicatePolicy(name));
        }
        self.policies.insert(name, Arc::new(requirement));
        Ok(())
    }

    /// Returns the requirement registered under `name`.
    pub fn get(&self, name: &str) -> AuthzResult<Arc<PermissionRequirement>> {
        self.policies
            .get(name)
            .cloned()
            .ok_or_else(|| AuthzError::UnknownPolicy(name.to_string()))
    }

    /// Returns `true` if a policy named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// Policy names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Number of registered policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` if no policy is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
