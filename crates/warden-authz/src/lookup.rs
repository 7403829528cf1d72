//! The permission lookup contract.
//!
//! The augmenter depends on a [`PermissionLookup`] handed to it at
//! construction. Implementations may be backed by anything (a database, a
//! cache, a remote service) and must be safe to call concurrently for
//! different subjects.
//!
//! A lookup distinguishes three results:
//!
//! | Result | Meaning |
//! |---|---|
//! | `Ok(Some(set))` | The subject's permissions |
//! | `Ok(None)` | Subject unknown, or known without permissions |
//! | `Err(LookupError)` | The backend could not answer |
//!
//! The augmenter denies on both of the last two, but logs them differently.

use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use warden_core::{BoxFuture, PermissionSet, SubjectId};

/// Why a lookup could not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The backing store failed.
    #[error("permission backend error: {0}")]
    Backend(String),

    /// The request was aborted while the lookup was in flight.
    #[error("permission lookup cancelled")]
    Cancelled,

    /// The lookup did not complete in time.
    #[error("permission lookup timed out after {0:?}")]
    Timeout(Duration),
}

impl LookupError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Cancelled => "cancelled",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Resolves the permissions granted to a subject.
///
/// `cancel` is tied to the lifetime of the request. Implementations that
/// perform I/O should stop work once it fires; the augmenter also races the
/// returned future against it, so a lookup that ignores it is still
/// abandoned.
pub trait PermissionLookup: Send + Sync {
    /// Returns the subject's permissions, `None` if there are none.
    fn permissions<'a>(
        &'a self,
        subject: &'a SubjectId,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>>;
}

impl<L: PermissionLookup + ?Sized> PermissionLookup for std::sync::Arc<L> {
    fn permissions<'a>(
        &'a self,
        subject: &'a SubjectId,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>> {
        (**self).permissions(subject, cancel)
    }
}

/// Bounds every call of an inner lookup with a deadline.
///
/// Timeouts belong to the lookup side of the contract; wrap a slow backend
/// in `TimeoutLookup` rather than teaching the augmenter about deadlines.
#[derive(Debug, Clone)]
pub struct TimeoutLookup<L> {
    inner: L,
    timeout: Duration,
}

impl<L> TimeoutLookup<L> {
    /// Wraps `inner` with the given deadline.
    pub const fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns the configured deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<L: PermissionLookup> PermissionLookup for TimeoutLookup<L> {
    fn permissions<'a>(
        &'a self,
        subject: &'a SubjectId,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.inner.permissions(subject, cancel)).await
            {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        subject = %subject,
                        timeout_ms = saturating_millis(self.timeout),
                        "permission lookup exceeded deadline"
                    );
                    Err(LookupError::Timeout(self.timeout))
                }
            }
        })
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Permission;

    struct Slow(Duration);

    impl PermissionLookup for Slow {
        fn permissions<'a>(
            &'a self,
            _subject: &'a SubjectId,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>> {
            Box::pin(async move {
                tokio::time::sleep(self.0).await;
                Ok(Some(PermissionSet::from([Permission::from("read")])))
            })
        }
    }

    fn bob() -> SubjectId {
        SubjectId::parse("bob").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_lookup_expires() {
        let lookup = TimeoutLookup::new(Slow(Duration::from_secs(5)), Duration::from_millis(100));
        let result = lookup.permissions(&bob(), &CancellationToken::new()).await;
        assert_eq!(result, Err(LookupError::Timeout(Duration::from_millis(100))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_lookup_passes_through() {
        let lookup = TimeoutLookup::new(Slow(Duration::from_millis(10)), Duration::from_secs(1));
        let result = lookup
            .permissions(&bob(), &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert!(result.contains(&Permission::from("read")));
    }

    #[test]
    fn test_saturating_millis() {
        assert_eq!(saturating_millis(Duration::from_millis(2000)), 2000);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(LookupError::backend("down").kind(), "backend");
        assert_eq!(LookupError::Cancelled.kind(), "cancelled");
        assert_eq!(
            LookupError::Timeout(Duration::from_millis(250)).to_string(),
            "permission lookup timed out after 250ms"
        );
    }
}
