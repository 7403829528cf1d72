//! Decision observer that logs and counts.
//!
//! The augmenter and evaluator call the observer while their span is
//! entered, so every event below inherits `subject`, `operation_id` and
//! `combinator` from the span.
//!
//! | Outcome | Level |
//! |---------|-------|
//! | missing subject | `error` |
//! | subject not found, lookup failed | `warn` |
//! | requirement not met | `info` |
//! | augmented, admitted, pass-through | `debug` |

use crate::metrics::{record_augmentation, record_authz_decision};
use warden_authz::{
    AugmentDenial, AugmentOutcome, AugmentationReport, Decision, DecisionObserver,
    EvaluationReport, PermissionOperator,
};

/// Emits a log event and a counter increment for every decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryObserver;

impl TelemetryObserver {
    /// Creates the observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionObserver for TelemetryObserver {
    fn on_augmentation(&self, report: &AugmentationReport<'_>) {
        let subject = report.subject.map(|s| s.as_str()).unwrap_or_default();

        match report.outcome {
            AugmentOutcome::PassThrough => {
                ::tracing::debug!("unauthenticated principal, permissions not attached");
            }
            AugmentOutcome::Augmented { permissions, .. } => {
                ::tracing::debug!(
                    subject,
                    permission_count = permissions.len(),
                    "permissions attached"
                );
            }
            AugmentOutcome::Denied(AugmentDenial::MissingSubject) => {
                ::tracing::error!("authenticated principal has no subject claim");
            }
            AugmentOutcome::Denied(AugmentDenial::NoPermissions) => {
                ::tracing::warn!(subject, "no permissions found for subject");
            }
            AugmentOutcome::Denied(AugmentDenial::LookupFailed(err)) => {
                ::tracing::warn!(
                    subject,
                    error = %err,
                    error_kind = err.kind(),
                    "permission lookup failed"
                );
            }
        }

        record_augmentation(report.outcome.label());
    }

    fn on_evaluation(&self, report: &EvaluationReport<'_>) {
        let combinator = report.requirement.operator();

        match report.decision {
            Decision::Admit => {
                ::tracing::debug!(
                    operation_id = report.operation_id.unwrap_or_default(),
                    %combinator,
                    "permission requirement met"
                );
            }
            Decision::Deny(reason) => {
                ::tracing::info!(
                    operation_id = report.operation_id.unwrap_or_default(),
                    %combinator,
                    %reason,
                    "permission requirement not met"
                );
            }
        }

        record_authz_decision(report.decision.result_label(), combinator_label(combinator));
    }
}

const fn combinator_label(operator: PermissionOperator) -> &'static str {
    match operator {
        PermissionOperator::And => "AND",
        PermissionOperator::Or => "OR",
    }
}
