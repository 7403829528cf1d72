//! Decision observers.
//!
//! The augmenter and the evaluator only decide. Everything that should
//! happen *because* of a decision (log events, counters, audit trails) is
//! done by a [`DecisionObserver`], which is called once per decision while
//! the decision's span is still entered.

use crate::augmenter::AugmentOutcome;
use crate::decision::Decision;
use crate::requirement::{PermissionOperator, PermissionRequirement};
use parking_lot::Mutex;
use warden_core::SubjectId;

/// What the augmenter reports after each attempt.
#[derive(Debug, Clone, Copy)]
pub struct AugmentationReport<'a> {
    /// The subject, when one was found on the principal.
    pub subject: Option<&'a SubjectId>,
    /// The outcome of the attempt.
    pub outcome: &'a AugmentOutcome,
}

/// What the evaluator reports after each evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationReport<'a> {
    /// The operation the requirement protects, when known.
    pub operation_id: Option<&'a str>,
    /// The evaluated requirement.
    pub requirement: &'a PermissionRequirement,
    /// The resulting decision.
    pub decision: &'a Decision,
}

/// Receives augmentation and evaluation reports.
///
/// Implementations must not block; they run inline on the request path.
pub trait DecisionObserver: Send + Sync {
    /// Called after every augmentation attempt, including pass-through.
    fn on_augmentation(&self, report: &AugmentationReport<'_>) {
        let _ = report;
    }

    /// Called after every requirement evaluation.
    fn on_evaluation(&self, report: &EvaluationReport<'_>) {
        let _ = report;
    }
}

/// An observer that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {}

/// An owned copy of a report, as kept by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedDecision {
    /// An augmentation attempt.
    Augmentation {
        /// Subject, if present.
        subject: Option<SubjectId>,
        /// Outcome label (see [`AugmentOutcome::label`]).
        outcome: &'static str,
    },
    /// A requirement evaluation.
    Evaluation {
        /// Operation id, if known.
        operation_id: Option<String>,
        /// Combinator of the requirement.
        combinator: PermissionOperator,
        /// The decision.
        decision: Decision,
    },
}

/// An observer that keeps every report in memory.
///
/// Meant for tests and local debugging.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedDecision>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedDecision> {
        self.events.lock().clone()
    }

    /// Returns only the evaluation decisions, in order.
    #[must_use]
    pub fn decisions(&self) -> Vec<Decision> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObservedDecision::Evaluation { decision, .. } => Some(decision.clone()),
                ObservedDecision::Augmentation { .. } => None,
            })
            .collect()
    }

    /// Returns only the augmentation outcome labels, in order.
    #[must_use]
    pub fn augmentation_outcomes(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObservedDecision::Augmentation { outcome, .. } => Some(*outcome),
                ObservedDecision::Evaluation { .. } => None,
            })
            .collect()
    }
}

impl DecisionObserver for RecordingObserver {
    fn on_augmentation(&self, report: &AugmentationReport<'_>) {
        self.events.lock().push(ObservedDecision::Augmentation {
            subject: report.subject.cloned(),
            outcome: report.outcome.label(),
        });
    }

    fn on_evaluation(&self, report: &EvaluationReport<'_>) {
        self.events.lock().push(ObservedDecision::Evaluation {
            operation_id: report.operation_id.map(ToString::to_string),
            combinator: report.requirement.operator(),
            decision: report.decision.clone(),
        });
    }
}
