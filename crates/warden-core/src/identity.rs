//! Identities and principals.
//!
//! A [`Principal`] is the caller of a request. It holds one or more
//! [`ClaimsIdentity`] values: the primary identity produced by the
//! authentication layer, plus any identities added later in the chain
//! (for instance the permissions identity attached during augmentation).

use crate::claims::{claim_types, Claim, ClaimSet};
use crate::permission::SubjectId;
use serde::{Deserialize, Serialize};

/// A set of claims issued by a single authority.
///
/// An identity is authenticated when it carries an authentication type
/// (for instance `"Bearer"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsIdentity {
    /// How the identity was established, `None` for unauthenticated identities.
    pub authentication_type: Option<String>,
    /// Claims asserted by this identity.
    pub claims: ClaimSet,
}

impl ClaimsIdentity {
    /// Creates an authenticated identity.
    pub fn authenticated(authentication_type: impl Into<String>, claims: ClaimSet) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims,
        }
    }

    /// Creates an identity that does not count as authenticated on its own.
    #[must_use]
    pub fn unauthenticated(claims: ClaimSet) -> Self {
        Self {
            authentication_type: None,
            claims,
        }
    }

    /// Returns `true` if this identity carries an authentication type.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.is_some()
    }
}

/// The caller of a request.
///
/// # Example
///
/// ```
/// use warden_core::{claim_types, ClaimSet, ClaimsIdentity, Principal};
///
/// let mut claims = ClaimSet::new();
/// claims.insert(claim_types::SUBJECT, "alice");
///
/// let principal = Principal::from_identity(ClaimsIdentity::authenticated("Bearer", claims));
/// assert!(principal.is_authenticated());
/// assert_eq!(principal.subject().unwrap().as_str(), "alice");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    identities: Vec<ClaimsIdentity>,
}

impl Principal {
    /// Creates a principal with no identities.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a principal from its primary identity.
    #[must_use]
    pub fn from_identity(identity: ClaimsIdentity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    /// Returns `true` if the primary identity is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identities
            .first()
            .is_some_and(ClaimsIdentity::is_authenticated)
    }

    /// Returns the primary identity, if any.
    #[must_use]
    pub fn primary_identity(&self) -> Option<&ClaimsIdentity> {
        self.identities.first()
    }

    /// Returns all identities in insertion order.
    #[must_use]
    pub fn identities(&self) -> &[ClaimsIdentity] {
        &self.identities
    }

    /// Appends an identity. Existing identities are left untouched.
    pub fn add_identity(&mut self, identity: ClaimsIdentity) {
        self.identities.push(identity);
    }

    /// Returns the first value of `claim_type` across all identities.
    #[must_use]
    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.identities
            .iter()
            .find_map(|identity| identity.claims.first(claim_type))
    }

    /// Returns the subject identifier, ignoring empty `sub` values.
    #[must_use]
    pub fn subject(&self) -> Option<SubjectId> {
        self.find_first(claim_types::SUBJECT)
            .and_then(SubjectId::parse)
    }

    /// Returns `true` if any identity carries the exact claim.
    #[must_use]
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.identities
            .iter()
            .any(|identity| identity.claims.contains(claim_type, value))
    }

    /// Returns the union of claims across all identities.
    #[must_use]
    pub fn claims(&self) -> ClaimSet {
        let mut merged = ClaimSet::new();
        for identity in &self.identities {
            merged.extend(&identity.claims);
        }
        merged
    }

    /// Returns every claim in wire form, identity by identity.
    pub fn wire_claims(&self) -> Vec<Claim> {
        self.identities
            .iter()
            .flat_map(|identity| identity.claims.iter())
            .collect()
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never includes claim values other than the subject.
    #[must_use]
    pub fn log_id(&self) -> String {
        match (self.is_authenticated(), self.subject()) {
            (true, Some(subject)) => format!("sub:{subject}"),
            (true, None) => "authenticated:no-sub".to_string(),
            (false, _) => "anonymous".to_string(),
        }
    }
}
