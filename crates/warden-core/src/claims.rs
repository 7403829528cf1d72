//! Claims and claim sets.
//!
//! Upstream authentication layers speak in flat `(type, value)` pairs, which
//! is what [`Claim`] models on the wire. Internally claims are grouped by
//! type in a [`ClaimSet`] so membership checks are a map lookup plus a set
//! lookup rather than a scan. Values of one type keep the order in which
//! they were first seen, so [`ClaimSet::first`] is the first-declared value.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known claim types.
pub mod claim_types {
    /// The standard JWT subject claim.
    pub const SUBJECT: &str = "sub";

    /// Claim type carrying one granted permission name per claim.
    pub const PERMISSIONS: &str = "permissions";

    /// Email claim, commonly issued alongside the subject.
    pub const EMAIL: &str = "email";

    /// Display name claim.
    pub const NAME: &str = "name";
}

/// A single `(type, value)` fact about a principal.
///
/// Serialized as `{"type": "...", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// The claim type (e.g. `sub`, `permissions`).
    #[serde(rename = "type")]
    pub claim_type: String,
    /// The claim value.
    pub value: String,
}

impl Claim {
    /// Creates a new claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.claim_type, self.value)
    }
}

/// Claims grouped by type.
///
/// A `ClaimSet` only ever grows: there is no removal API, which keeps
/// identity augmentation additive.
///
/// # Example
///
/// ```
/// use warden_core::{claim_types, ClaimSet};
///
/// let mut claims = ClaimSet::new();
/// claims.insert(claim_types::SUBJECT, "alice");
/// claims.insert(claim_types::PERMISSIONS, "read");
///
/// assert!(claims.contains(claim_types::PERMISSIONS, "read"));
/// assert!(!claims.contains(claim_types::PERMISSIONS, "Read"));
/// assert_eq!(claims.first(claim_types::SUBJECT), Some("alice"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    by_type: BTreeMap<String, IndexSet<String>>,
}

impl ClaimSet {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claim. Returns `false` if the exact claim was already present.
    pub fn insert(&mut self, claim_type: impl Into<String>, value: impl Into<String>) -> bool {
        self.by_type
            .entry(claim_type.into())
            .or_default()
            .insert(value.into())
    }

    /// Adds a wire claim.
    pub fn insert_claim(&mut self, claim: Claim) -> bool {
        self.insert(claim.claim_type, claim.value)
    }

    /// Exact-match membership test on both type and value.
    #[must_use]
    pub fn contains(&self, claim_type: &str, value: &str) -> bool {
        self.by_type
            .get(claim_type)
            .is_some_and(|values| values.contains(value))
    }

    /// Returns every value recorded for a claim type, in insertion order.
    pub fn values<'a>(&'a self, claim_type: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_type
            .get(claim_type)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Returns the first value recorded for a claim type.
    ///
    /// "First" is first-inserted, not smallest.
    #[must_use]
    pub fn first(&self, claim_type: &str) -> Option<&str> {
        self.by_type
            .get(claim_type)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Unions another claim set into this one.
    pub fn extend(&mut self, other: &ClaimSet) {
        for (claim_type, values) in &other.by_type {
            self.by_type
                .entry(claim_type.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Returns `true` if every claim of `other` is also in `self`.
    #[must_use]
    pub fn is_superset_of(&self, other: &ClaimSet) -> bool {
        other
            .by_type
            .iter()
            .all(|(claim_type, values)| match self.by_type.get(claim_type) {
                Some(own) => values.is_subset(own),
                None => values.is_empty(),
            })
    }

    /// Iterates over all claims in wire form.
    pub fn iter(&self) -> impl Iterator<Item = Claim> + '_ {
        self.by_type.iter().flat_map(|(claim_type, values)| {
            values
                .iter()
                .map(move |value| Claim::new(claim_type.clone(), value.clone()))
        })
    }

    /// Total number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.values().map(IndexSet::len).sum()
    }

    /// Returns `true` if there are no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        let mut set = Self::new();
        for claim in iter {
            set.insert_claim(claim);
        }
        set
    }
}

impl Serialize for ClaimSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ClaimSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let claims = Vec::<Claim>::deserialize(deserializer)?;
        Ok(claims.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_and_contains() {
        let mut claims = ClaimSet::new();
        assert!(claims.insert("permissions", "read"));
        assert!(!claims.insert("permissions", "read"));

        assert!(claims.contains("permissions", "read"));
        assert!(!claims.contains("permissions", "write"));
        assert!(!claims.contains("role", "read"));
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_exact_match_only() {
        let mut claims = ClaimSet::new();
        claims.insert("permissions", "create");

        assert!(!claims.contains("permissions", "Create"));
        assert!(!claims.contains("permissions", "creat"));
        assert!(!claims.contains("permissions", "*"));
    }

    #[test]
    fn test_values_and_first() {
        let mut claims = ClaimSet::new();
        claims.insert("permissions", "update");
        claims.insert("permissions", "create");

        let values: Vec<_> = claims.values("permissions").collect();
        assert_eq!(values, vec!["update", "create"]);
        assert_eq!(claims.first("permissions"), Some("update"));
        assert_eq!(claims.first("sub"), None);
        assert_eq!(claims.values("sub").count(), 0);
    }

    #[test]
    fn test_first_is_first_declared() {
        let claims: ClaimSet = [Claim::new("sub", "zed"), Claim::new("sub", "")]
            .into_iter()
            .collect();
        assert_eq!(claims.first("sub"), Some("zed"));

        let claims: ClaimSet = [Claim::new("sub", "bob"), Claim::new("sub", "alice")]
            .into_iter()
            .collect();
        assert_eq!(claims.first("sub"), Some("bob"));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut claims = ClaimSet::new();
        claims.insert("sub", "bob");
        claims.insert("sub", "alice");
        assert!(!claims.insert("sub", "bob"));
        assert_eq!(claims.first("sub"), Some("bob"));
    }

    #[test]
    fn test_wire_format() {
        let mut claims = ClaimSet::new();
        claims.insert("sub", "alice");

        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"[{"type":"sub","value":"alice"}]"#);

        let parsed: ClaimSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, claims);
    }

    #[test]
    fn test_claim_display() {
        assert_eq!(Claim::new("sub", "bob").to_string(), "sub=bob");
    }

    proptest! {
        #[test]
        fn extend_is_additive(
            left in proptest::collection::vec(("[a-c]", "[a-e]{1,3}"), 0..8),
            right in proptest::collection::vec(("[a-c]", "[a-e]{1,3}"), 0..8),
        ) {
            let left: ClaimSet = left.into_iter().map(|(t, v)| Claim::new(t, v)).collect();
            let right: ClaimSet = right.into_iter().map(|(t, v)| Claim::new(t, v)).collect();

            let mut merged = left.clone();
            merged.extend(&right);

            prop_assert!(merged.is_superset_of(&left));
            prop_assert!(merged.is_superset_of(&right));
            prop_assert!(merged.len() <= left.len() + right.len());
        }
    }
}
