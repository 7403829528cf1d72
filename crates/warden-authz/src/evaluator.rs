//! Requirement evaluation with telemetry.

use crate::decision::{evaluate, Decision};
use crate::observer::{DecisionObserver, EvaluationReport, NoopObserver};
use crate::requirement::PermissionRequirement;
use std::fmt;
use std::sync::Arc;
use tracing::field::Empty;
use warden_core::{ClaimSet, Principal};

/// Evaluates requirements inside a `permissions.evaluate` span and reports
/// each decision to an observer.
///
/// Evaluation never blocks and never suspends. The evaluator holds no
/// per-request state and can be shared freely.
#[derive(Clone)]
pub struct RequirementEvaluator {
    observer: Arc<dyn DecisionObserver>,
}

impl RequirementEvaluator {
    /// Creates an evaluator that reports nowhere.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observer: Arc::new(NoopObserver),
        }
    }

    /// Sets the observer notified after every evaluation.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Evaluates a requirement against a claim set.
    pub fn evaluate(&self, requirement: &PermissionRequirement, claims: &ClaimSet) -> Decision {
        self.evaluate_operation(None, requirement, claims)
    }

    /// Evaluates a requirement against every identity of a principal.
    pub fn evaluate_principal(
        &self,
        requirement: &PermissionRequirement,
        principal: &Principal,
    ) -> Decision {
        self.evaluate_operation(None, requirement, &principal.claims())
    }

    /// Evaluates a requirement protecting a named operation.
    pub fn evaluate_operation(
        &self,
        operation_id: Option<&str>,
        requirement: &PermissionRequirement,
        claims: &ClaimSet,
    ) -> Decision {
        let span = tracing::info_span!(
            "permissions.evaluate",
            combinator = %requirement.operator(),
            operation_id = operation_id.unwrap_or_default(),
            outcome = Empty,
            otel.status_code = Empty,
        );
        let _entered = span.enter();

        let decision = evaluate(requirement, claims);

        span.record("outcome", decision.result_label());
        span.record(
            "otel.status_code",
            if decision.is_admit() { "OK" } else { "ERROR" },
        );

        self.observer.on_evaluation(&EvaluationReport {
            operation_id,
            requirement,
            decision: &decision,
        });

        decision
    }
}

impl Default for RequirementEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequirementEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequirementEvaluator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DenyReason;
    use crate::observer::{ObservedDecision, RecordingObserver};
    use crate::requirement::PermissionOperator;
    use crate::span_capture::SpanCapture;
    use warden_core::{claim_types, ClaimsIdentity, Permission};

    #[test]
    fn test_evaluator_reports_each_decision() {
        let observer = Arc::new(RecordingObserver::new());
        let evaluator = RequirementEvaluator::new().with_observer(observer.clone());

        let mut claims = ClaimSet::new();
        claims.insert(claim_types::PERMISSIONS, "read");

        let requirement = PermissionRequirement::all(["create", "read"]).unwrap();
        let decision = evaluator.evaluate_operation(Some("createUser"), &requirement, &claims);
        assert_eq!(
            decision,
            Decision::Deny(DenyReason::MissingPermission(Permission::from("create")))
        );

        assert_eq!(
            observer.events(),
            vec![ObservedDecision::Evaluation {
                operation_id: Some("createUser".to_string()),
                combinator: PermissionOperator::And,
                decision,
            }]
        );
    }

    #[test]
    fn test_evaluate_principal_reads_every_identity() {
        let mut subject = ClaimSet::new();
        subject.insert(claim_types::SUBJECT, "bob");
        let mut principal =
            Principal::from_identity(ClaimsIdentity::authenticated("Bearer", subject));

        let mut permissions = ClaimSet::new();
        permissions.insert(claim_types::PERMISSIONS, "read");
        principal.add_identity(ClaimsIdentity::unauthenticated(permissions));

        let requirement = PermissionRequirement::any(["create", "read"]).unwrap();
        assert!(RequirementEvaluator::default()
            .evaluate_principal(&requirement, &principal)
            .is_admit());
    }

    #[test]
    fn test_evaluate_span_fields() {
        let capture = SpanCapture::default();
        let evaluator = RequirementEvaluator::new();
        let requirement = PermissionRequirement::all(["create", "update"]).unwrap();
        let mut claims = ClaimSet::new();
        claims.insert(claim_types::PERMISSIONS, "read");

        let decision = capture.run(|| {
            evaluator.evaluate_operation(Some("updateOrder"), &requirement, &claims)
        });
        assert!(!decision.is_admit());

        let spans = capture.named("permissions.evaluate");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].field("combinator"), Some("AND"));
        assert_eq!(spans[0].field("operation_id"), Some("updateOrder"));
        assert_eq!(spans[0].field("outcome"), Some("unauthorized"));
        assert_eq!(spans[0].field("otel.status_code"), Some("ERROR"));
    }
}
