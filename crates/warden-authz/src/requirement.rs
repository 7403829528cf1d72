//! Permission requirements.
//!
//! A requirement is declared once per protected operation and never changes
//! afterwards. It has exactly two shapes, modelled as a tagged variant:
//!
//! - [`PermissionRequirement::And`] - every listed permission must be held
//! - [`PermissionRequirement::Or`] - at least one listed permission must be held
//!
//! Requirements also have a compact textual form used by configuration files
//! and environment overrides: `and:create,update` or `or:create,read`.

use crate::error::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use warden_core::Permission;

/// How the permissions of a requirement are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionOperator {
    /// All permissions are required.
    And,
    /// Any one permission is sufficient.
    Or,
}

impl PermissionOperator {
    /// Lowercase name, as used in the textual form and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for PermissionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

impl FromStr for PermissionOperator {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "all" => Ok(Self::And),
            "or" | "any" => Ok(Self::Or),
            other => Err(AuthzError::invalid_requirement(
                s,
                format!("unknown combinator '{other}'"),
            )),
        }
    }
}

/// An immutable permission requirement.
///
/// The permission list is non-empty, keeps declaration order and holds no
/// duplicates. Construct it with [`PermissionRequirement::all`],
/// [`PermissionRequirement::any`] or by parsing the textual form.
///
/// # Example
///
/// ```
/// use warden_authz::{PermissionOperator, PermissionRequirement};
///
/// let requirement: PermissionRequirement = "and:create,update".parse().unwrap();
/// assert_eq!(requirement.operator(), PermissionOperator::And);
/// assert_eq!(requirement.permissions().len(), 2);
///
/// assert!(PermissionRequirement::any(Vec::<&str>::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "operator", content = "permissions", rename_all = "lowercase")]
pub enum PermissionRequirement {
    /// Every permission must be present.
    And(Vec<Permission>),
    /// At least one permission must be present.
    Or(Vec<Permission>),
}

impl PermissionRequirement {
    /// Creates a requirement satisfied only when every permission is held.
    pub fn all<I, P>(permissions: I) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::new(PermissionOperator::And, permissions)
    }

    /// Creates a requirement satisfied when any one permission is held.
    pub fn any<I, P>(permissions: I) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::new(PermissionOperator::Or, permissions)
    }

    /// Creates a requirement from an operator and a permission list.
    pub fn new<I, P>(operator: PermissionOperator, permissions: I) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        let mut list: Vec<Permission> = Vec::new();
        for permission in permissions {
            let permission = permission.into();
            if !list.contains(&permission) {
                list.push(permission);
            }
        }

        if list.is_empty() {
            return Err(AuthzError::EmptyRequirement);
        }

        Ok(match operator {
            PermissionOperator::And => Self::And(list),
            PermissionOperator::Or => Self::Or(list),
        })
    }

    /// Returns the combinator.
    #[must_use]
    pub const fn operator(&self) -> PermissionOperator {
        match self {
            Self::And(_) => PermissionOperator::And,
            Self::Or(_) => PermissionOperator::Or,
        }
    }

    /// Returns the required permissions in declaration order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        match self {
            Self::And(permissions) | Self::Or(permissions) => permissions,
        }
    }
}

impl fmt::Display for PermissionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.operator().as_str())?;
        for (index, permission) in self.permissions().iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(permission.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for PermissionRequirement {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (operator, list) = s.split_once(':').ok_or_else(|| {
            AuthzError::invalid_requirement(s, "expected '<and|or>:<permissions>'")
        })?;

        let operator: PermissionOperator = operator.parse()?;
        let permissions: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        Self::new(operator, permissions)
    }
}

impl<'de> Deserialize<'de> for PermissionRequirement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Structured {
                operator: PermissionOperator,
                permissions: Vec<Permission>,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Structured {
                operator,
                permissions,
            } => Self::new(operator, permissions).map_err(serde::de::Error::custom),
        }
    }
}
