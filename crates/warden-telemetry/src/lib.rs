//! Observability for Warden authorization decisions.
//!
//! - **Logging**: JSON or pretty `tracing-subscriber` output
//! - **Metrics**: Prometheus counters via the `metrics` crate
//! - **Tracing**: OTLP export of the `permissions.augment` and
//!   `permissions.evaluate` spans
//! - **Observer**: [`TelemetryObserver`] turns every augmentation and
//!   evaluation into a log event and a counter increment
//!
//! ```text
//!  IdentityAugmenter ──┐
//!                      ├──► TelemetryObserver ──► log events ──► stdout
//!  RequirementEvaluator┘          │
//!                                 └──────────► counters ──► /metrics
//!
//!  spans ───────────────────────────────────────────────► OTLP collector
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_authz::RequirementEvaluator;
//! use warden_telemetry::{init_telemetry, TelemetryConfig, TelemetryObserver};
//!
//! let _guard = init_telemetry(&TelemetryConfig::default())?;
//! let evaluator = RequirementEvaluator::new().with_observer(Arc::new(TelemetryObserver::new()));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod observer;
pub mod tracing;

pub use self::config::TelemetryConfig;
pub use self::error::TelemetryError;
pub use self::logging::{init_logging, LogConfig};
pub use self::metrics::{init_metrics, render_metrics, MetricsConfig};
pub use self::observer::TelemetryObserver;
pub use self::tracing::{init_tracing, TracingConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Flushes and shuts down the tracer provider on drop.
///
/// Keep it alive for the lifetime of the application.
#[must_use = "dropping the guard shuts down span export"]
pub struct TelemetryGuard {
    tracer_provider: Option<opentelemetry_sdk::trace::TracerProvider>,
}

impl TelemetryGuard {
    /// Wraps an optional tracer provider.
    pub fn new(tracer_provider: Option<opentelemetry_sdk::trace::TracerProvider>) -> Self {
        Self { tracer_provider }
    }

    /// Whether span export is active.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.tracer_provider.is_some()
    }
}

impl std::fmt::Debug for TelemetryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryGuard")
            .field("exporting", &self.is_exporting())
            .finish()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            for result in provider.force_flush() {
                if let Err(e) = result {
                    eprintln!("Error flushing tracer provider: {e}");
                }
            }
            if let Err(e) = provider.shutdown() {
                eprintln!("Error shutting down tracer provider: {e}");
            }
        }
    }
}

/// Initializes logging, metrics and span export, in that order.
///
/// # Errors
///
/// Returns the first subsystem failure.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<TelemetryGuard> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    let tracer_provider = init_tracing(&config.tracing)?;

    Ok(TelemetryGuard::new(tracer_provider))
}
