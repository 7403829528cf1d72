//! In-memory permission store.

use crate::lookup::{LookupError, PermissionLookup};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use warden_core::permission::well_known;
use warden_core::{BoxFuture, Permission, PermissionSet, SubjectId};

/// A [`PermissionLookup`] backed by a map held in memory.
///
/// Grants can be changed at runtime; a change is visible to the next
/// lookup, never to one already in progress.
///
/// # Example
///
/// ```
/// use warden_authz::InMemoryPermissionStore;
/// use warden_core::SubjectId;
///
/// let store = InMemoryPermissionStore::new();
/// let carol = SubjectId::parse("carol").unwrap();
/// store.grant(&carol, ["read", "update"]);
/// assert_eq!(store.granted(&carol).len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    grants: RwLock<HashMap<SubjectId, PermissionSet>>,
}

impl InMemoryPermissionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the demo grants: `alice` holds every
    /// CRUD permission, `bob` may only read.
    #[must_use]
    pub fn with_demo_grants() -> Self {
        let store = Self::new();
        if let Some(alice) = SubjectId::parse("alice") {
            store.grant(&alice, well_known::ALL);
        }
        if let Some(bob) = SubjectId::parse("bob") {
            store.grant(&bob, [well_known::READ]);
        }
        store
    }

    /// Adds permissions to a subject's grant.
    pub fn grant<I, P>(&self, subject: &SubjectId, permissions: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.grants
            .write()
            .entry(subject.clone())
            .or_default()
            .extend(permissions.into_iter().map(Into::into));
    }

    /// Removes every permission of a subject. Returns `true` if it had any.
    pub fn revoke_all(&self, subject: &SubjectId) -> bool {
        self.grants.write().remove(subject).is_some()
    }

    /// Returns a snapshot of a subject's permissions.
    #[must_use]
    pub fn granted(&self, subject: &SubjectId) -> PermissionSet {
        self.grants.read().get(subject).cloned().unwrap_or_default()
    }

    /// Number of subjects with at least one grant recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.read().len()
    }

    /// Returns `true` if no subject has a grant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.read().is_empty()
    }
}

impl PermissionLookup for InMemoryPermissionStore {
    fn permissions<'a>(
        &'a self,
        subject: &'a SubjectId,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(LookupError::Cancelled);
            }
            let found = self
                .grants
                .read()
                .get(subject)
                .filter(|set| !set.is_empty())
                .cloned();
            Ok(found)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(name: &str) -> SubjectId {
        SubjectId::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_demo_grants() {
        let store = InMemoryPermissionStore::with_demo_grants();
        let token = CancellationToken::new();

        let alice = store.permissions(&subject("alice"), &token).await.unwrap().unwrap();
        assert_eq!(alice.len(), 4);

        let bob = store.permissions(&subject("bob"), &token).await.unwrap().unwrap();
        assert_eq!(bob, PermissionSet::from([Permission::from("read")]));

        assert_eq!(store.permissions(&subject("carol"), &token).await, Ok(None));
    }

    #[tokio::test]
    async fn test_empty_grant_is_not_found() {
        let store = InMemoryPermissionStore::new();
        store.grant(&subject("dave"), Vec::<Permission>::new());
        assert_eq!(store.len(), 1);

        let result = store.permissions(&subject("dave"), &CancellationToken::new()).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_cancelled_before_lookup() {
        let store = InMemoryPermissionStore::with_demo_grants();
        let token = CancellationToken::new();
        token.cancel();

        let result = store.permissions(&subject("alice"), &token).await;
        assert_eq!(result, Err(LookupError::Cancelled));
    }

    #[test]
    fn test_revoke_all() {
        let store = InMemoryPermissionStore::with_demo_grants();
        assert!(store.revoke_all(&subject("bob")));
        assert!(!store.revoke_all(&subject("bob")));
        assert!(store.granted(&subject("bob")).is_empty());
        assert!(!store.is_empty());
    }
}
