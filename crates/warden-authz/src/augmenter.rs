//! Identity augmentation.
//!
//! Once per request, the [`IdentityAugmenter`] resolves the permissions of an
//! authenticated principal and attaches them as an additional identity
//! carrying one `permissions` claim per granted permission.
//!
//! # Flow
//!
//! ```text
//! principal ──► authenticated? ──no──► PassThrough
//!                    │ yes
//!                    ▼
//!               sub claim? ──no──► Denied(MissingSubject)      "User 'sub' claim is required"
//!                    │ yes
//!                    ▼
//!           lookup (raced against cancel)
//!             │        │          │
//!          Some(set)  None      Err
//!             │        │          └──► Denied(LookupFailed)   "Access denied"
//!             │        └─────────────► Denied(NoPermissions)  "Access denied"
//!             ▼
//!         Augmented
//! ```
//!
//! Every failure denies. Nothing is retried.

use crate::lookup::{LookupError, PermissionLookup};
use crate::observer::{AugmentationReport, DecisionObserver, NoopObserver};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::field::Empty;
use tracing::Instrument;
use warden_core::{
    claim_types, ClaimSet, ClaimsIdentity, PermissionSet, Principal, SubjectId, WardenError,
};

/// Message returned when the principal has no usable subject claim.
pub const MISSING_SUBJECT_MESSAGE: &str = "User 'sub' claim is required";

/// Message returned for every other denial.
pub const GENERIC_DENIAL_MESSAGE: &str = "Access denied";

/// Why augmentation denied the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AugmentDenial {
    /// The principal is authenticated but carries no non-empty `sub` claim.
    MissingSubject,
    /// The lookup found no permissions for the subject.
    NoPermissions,
    /// The lookup could not answer.
    LookupFailed(LookupError),
}

impl AugmentDenial {
    /// Message safe to return to the caller.
    ///
    /// `NoPermissions` and `LookupFailed` share the generic message so callers
    /// cannot tell which subjects exist.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MissingSubject => MISSING_SUBJECT_MESSAGE,
            Self::NoPermissions | Self::LookupFailed(_) => GENERIC_DENIAL_MESSAGE,
        }
    }

    /// Converts the denial into the error rendered at the HTTP boundary.
    #[must_use]
    pub fn to_error(&self) -> WardenError {
        WardenError::access_denied(self.public_message())
    }
}

impl fmt::Display for AugmentDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSubject => f.write_str("subject claim missing"),
            Self::NoPermissions => f.write_str("no permissions found for subject"),
            Self::LookupFailed(err) => write!(f, "permission lookup failed: {err}"),
        }
    }
}

/// Result of one augmentation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AugmentOutcome {
    /// The principal is not authenticated; nothing was done.
    PassThrough,
    /// A permissions identity was attached to the principal.
    Augmented {
        /// The subject whose permissions were attached.
        subject: SubjectId,
        /// The attached permissions.
        permissions: PermissionSet,
    },
    /// The request must be rejected.
    Denied(AugmentDenial),
}

impl AugmentOutcome {
    /// Short label for spans and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass_through",
            Self::Augmented { .. } => "augmented",
            Self::Denied(AugmentDenial::MissingSubject) => "missing_subject",
            Self::Denied(AugmentDenial::NoPermissions) => "not_found",
            Self::Denied(AugmentDenial::LookupFailed(_)) => "lookup_failed",
        }
    }

    /// Returns `true` if the request may continue.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, Self::Denied(_))
    }

    /// Returns the denial, if any.
    #[must_use]
    pub const fn denial(&self) -> Option<&AugmentDenial> {
        match self {
            Self::Denied(denial) => Some(denial),
            _ => None,
        }
    }
}

/// Attaches a subject's permissions to its principal.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use warden_authz::{AugmentOutcome, IdentityAugmenter, InMemoryPermissionStore};
/// use warden_core::{claim_types, ClaimSet, ClaimsIdentity, Principal};
///
/// # tokio_test::block_on(async {
/// let augmenter = IdentityAugmenter::new(Arc::new(InMemoryPermissionStore::with_demo_grants()));
///
/// let mut claims = ClaimSet::new();
/// claims.insert(claim_types::SUBJECT, "bob");
/// let mut principal = Principal::from_identity(ClaimsIdentity::authenticated("Bearer", claims));
///
/// let outcome = augmenter.augment(&mut principal, &CancellationToken::new()).await;
/// assert!(matches!(outcome, AugmentOutcome::Augmented { .. }));
/// assert!(principal.has_claim(claim_types::PERMISSIONS, "read"));
/// # });
/// ```
#[derive(Clone)]
pub struct IdentityAugmenter {
    lookup: Arc<dyn PermissionLookup>,
    observer: Arc<dyn DecisionObserver>,
}

impl IdentityAugmenter {
    /// Creates an augmenter over the given lookup.
    #[must_use]
    pub fn new(lookup: Arc<dyn PermissionLookup>) -> Self {
        Self {
            lookup,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Sets the observer notified after every attempt.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Augments `principal` in place.
    ///
    /// The principal is only modified on [`AugmentOutcome::Augmented`], and
    /// only by appending an identity.
    pub async fn augment(
        &self,
        principal: &mut Principal,
        cancel: &CancellationToken,
    ) -> AugmentOutcome {
        if !principal.is_authenticated() {
            let outcome = AugmentOutcome::PassThrough;
            self.notify(None, &outcome);
            return outcome;
        }

        let span = tracing::info_span!(
            "permissions.augment",
            subject = Empty,
            outcome = Empty,
            otel.status_code = Empty,
            otel.status_description = Empty,
        );

        self.augment_authenticated(principal, cancel, &span)
            .instrument(span.clone())
            .await
    }

    async fn augment_authenticated(
        &self,
        principal: &mut Principal,
        cancel: &CancellationToken,
        span: &tracing::Span,
    ) -> AugmentOutcome {
        let Some(subject) = principal.subject() else {
            let outcome = AugmentOutcome::Denied(AugmentDenial::MissingSubject);
            self.finish(span, None, &outcome);
            return outcome;
        };
        span.record("subject", subject.as_str());

        let lookup = self.lookup.permissions(&subject, cancel);
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LookupError::Cancelled),
            result = lookup => result,
        };

        let outcome = match result {
            Ok(Some(permissions)) if !permissions.is_empty() => {
                principal.add_identity(permissions_identity(&permissions));
                AugmentOutcome::Augmented {
                    subject: subject.clone(),
                    permissions,
                }
            }
            Ok(_) => AugmentOutcome::Denied(AugmentDenial::NoPermissions),
            Err(err) => AugmentOutcome::Denied(AugmentDenial::LookupFailed(err)),
        };

        self.finish(span, Some(&subject), &outcome);
        outcome
    }

    fn finish(&self, span: &tracing::Span, subject: Option<&SubjectId>, outcome: &AugmentOutcome) {
        span.record("outcome", outcome.label());
        match outcome.denial() {
            Some(denial) => {
                span.record("otel.status_code", "ERROR");
                span.record("otel.status_description", denial.to_string().as_str());
            }
            None => {
                span.record("otel.status_code", "OK");
            }
        }
        self.notify(subject, outcome);
    }

    fn notify(&self, subject: Option<&SubjectId>, outcome: &AugmentOutcome) {
        self.observer
            .on_augmentation(&AugmentationReport { subject, outcome });
    }
}

impl fmt::Debug for IdentityAugmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAugmenter").finish_non_exhaustive()
    }
}

fn permissions_identity(permissions: &PermissionSet) -> ClaimsIdentity {
    let mut claims = ClaimSet::new();
    for permission in permissions {
        claims.insert(claim_types::PERMISSIONS, permission.as_str());
    }
    ClaimsIdentity::unauthenticated(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::span_capture::SpanCapture;
    use crate::store::InMemoryPermissionStore;
    use std::time::Duration;
    use warden_core::BoxFuture;

    fn principal_with_sub(sub: &str) -> Principal {
        let mut claims = ClaimSet::new();
        claims.insert(claim_types::SUBJECT, sub);
        claims.insert(claim_types::EMAIL, format!("{sub}@example.com"));
        Principal::from_identity(ClaimsIdentity::authenticated("Bearer", claims))
    }

    fn augmenter() -> (IdentityAugmenter, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let store = Arc::new(InMemoryPermissionStore::with_demo_grants());
        let augmenter = IdentityAugmenter::new(store).with_observer(observer.clone());
        (augmenter, observer)
    }

    struct Failing;

    impl PermissionLookup for Failing {
        fn permissions<'a>(
            &'a self,
            _subject: &'a SubjectId,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>> {
            Box::pin(async { Err(LookupError::backend("connection refused")) })
        }
    }

    struct Hanging;

    impl PermissionLookup for Hanging {
        fn permissions<'a>(
            &'a self,
            _subject: &'a SubjectId,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Option<PermissionSet>, LookupError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            })
        }
    }

    #[tokio::test]
    async fn test_anonymous_passes_through_untouched() {
        let (augmenter, observer) = augmenter();
        let mut principal = Principal::anonymous();

        let outcome = augmenter.augment(&mut principal, &CancellationToken::new()).await;
        assert_eq!(outcome, AugmentOutcome::PassThrough);
        assert_eq!(principal, Principal::anonymous());
        assert_eq!(observer.augmentation_outcomes(), vec!["pass_through"]);
    }

    #[tokio::test]
    async fn test_augmentation_is_additive() {
        let (augmenter, _) = augmenter();
        let mut principal = principal_with_sub("alice");
        let before = principal.claims();

        let outcome = augmenter.augment(&mut principal, &CancellationToken::new()).await;
        assert!(outcome.is_allowed());
        assert!(principal.claims().is_superset_of(&before));
        for permission in ["create", "read", "update", "delete"] {
            assert!(principal.has_claim(claim_types::PERMISSIONS, permission));
        }
        assert_eq!(principal.identities().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_sub_denied_with_specific_message() {
        let (augmenter, observer) = augmenter();
        let mut principal = principal_with_sub("");

        let outcome = augmenter.augment(&mut principal, &CancellationToken::new()).await;
        let denial = outcome.denial().unwrap();
        assert_eq!(denial, &AugmentDenial::MissingSubject);
        assert_eq!(denial.public_message(), "User 'sub' claim is required");
        assert_eq!(principal.identities().len(), 1);
        assert_eq!(observer.augmentation_outcomes(), vec!["missing_subject"]);
    }

    #[tokio::test]
    async fn test_backend_error_denies_generically() {
        let mut principal = principal_with_sub("alice");
        let augmenter = IdentityAugmenter::new(Arc::new(Failing));

        let outcome = augmenter.augment(&mut principal, &CancellationToken::new()).await;
        assert_eq!(outcome.label(), "lookup_failed");
        assert_eq!(outcome.denial().unwrap().public_message(), "Access denied");
        assert_eq!(
            outcome.denial().unwrap().to_error().error_code(),
            "ACCESS_DENIED"
        );
    }

    #[tokio::test]
    async fn test_cancellation_aborts_lookup() {
        let mut principal = principal_with_sub("alice");
        let augmenter = IdentityAugmenter::new(Arc::new(Hanging));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let outcome = augmenter.augment(&mut principal, &token).await;
        assert_eq!(
            outcome,
            AugmentOutcome::Denied(AugmentDenial::LookupFailed(LookupError::Cancelled))
        );
    }

    #[test]
    fn test_augment_span_without_subject() {
        let capture = SpanCapture::default();
        let (augmenter, _) = augmenter();
        let mut principal = principal_with_sub("");

        capture.run(|| {
            tokio_test::block_on(augmenter.augment(&mut principal, &CancellationToken::new()))
        });

        let spans = capture.named("permissions.augment");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].field("subject"), None);
        assert_eq!(spans[0].field("outcome"), Some("missing_subject"));
        assert_eq!(spans[0].field("otel.status_code"), Some("ERROR"));
    }

    #[test]
    fn test_augment_span_for_unknown_subject() {
        let capture = SpanCapture::default();
        let (augmenter, _) = augmenter();
        let mut principal = principal_with_sub("carol");

        capture.run(|| {
            tokio_test::block_on(augmenter.augment(&mut principal, &CancellationToken::new()))
        });

        let spans = capture.named("permissions.augment");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].field("subject"), Some("carol"));
        assert_eq!(spans[0].field("outcome"), Some("not_found"));
    }

    #[test]
    fn test_anonymous_opens_no_span() {
        let capture = SpanCapture::default();
        let (augmenter, _) = augmenter();
        let mut principal = Principal::anonymous();

        capture.run(|| {
            tokio_test::block_on(augmenter.augment(&mut principal, &CancellationToken::new()))
        });

        assert!(capture.named("permissions.augment").is_empty());
    }
}
