//! Subject and permission vocabulary.
//!
//! Permission names are opaque and compared byte for byte: there is no
//! hierarchy, no wildcard and no case folding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of an authenticated principal, taken from the `sub` claim.
///
/// A `SubjectId` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a subject identifier, rejecting empty strings.
    ///
    /// ```
    /// use warden_core::SubjectId;
    ///
    /// assert!(SubjectId::parse("alice").is_some());
    /// assert!(SubjectId::parse("").is_none());
    /// ```
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).ok_or_else(|| serde::de::Error::custom("subject identifier is empty"))
    }
}

/// Name of a grantable capability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the permission name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// The permission catalogue seeded by default deployments.
pub mod well_known {
    /// Create resources.
    pub const CREATE: &str = "create";
    /// Read resources.
    pub const READ: &str = "read";
    /// Update resources.
    pub const UPDATE: &str = "update";
    /// Delete resources.
    pub const DELETE: &str = "delete";

    /// All four CRUD permissions.
    pub const ALL: [&str; 4] = [CREATE, READ, UPDATE, DELETE];
}

/// The set of permissions held by a subject, as returned by a lookup.
pub type PermissionSet = BTreeSet<Permission>;
