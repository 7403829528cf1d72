//! Prometheus metrics for authorization decisions.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `warden_authz_decisions_total` | Counter | `result`, `combinator` | Requirement evaluations |
//! | `warden_permission_augmentations_total` | Counter | `outcome` | Augmentation attempts |
//!
//! `result` is `authorized` or `unauthorized`; `combinator` is `AND` or `OR`.
//! `outcome` is one of `pass_through`, `augmented`, `missing_subject`,
//! `not_found`, `lookup_failed`.
//!
//! Recording functions are no-ops until a recorder is installed, so the
//! engine can run without metrics.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

/// Counter of requirement evaluations.
pub const AUTHZ_DECISIONS_TOTAL: &str = "warden_authz_decisions_total";

/// Counter of augmentation attempts.
pub const PERMISSION_AUGMENTATIONS_TOTAL: &str = "warden_permission_augmentations_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus exporter.
    pub enabled: bool,

    /// Address the `/metrics` listener binds to.
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Installs the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for a bad listen address and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let handle = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    describe_metrics();

    Ok(())
}

/// Renders metrics in Prometheus text format, if the exporter is installed.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers help text for every warden metric.
pub fn describe_metrics() {
    describe_counter!(
        AUTHZ_DECISIONS_TOTAL,
        "Permission requirement evaluations by result and combinator"
    );
    describe_counter!(
        PERMISSION_AUGMENTATIONS_TOTAL,
        "Identity augmentation attempts by outcome"
    );
}

/// Records one requirement evaluation.
pub fn record_authz_decision(result: &'static str, combinator: &'static str) {
    counter!(
        AUTHZ_DECISIONS_TOTAL,
        "result" => result,
        "combinator" => combinator
    )
    .increment(1);
}

/// Records one augmentation attempt.
pub fn record_augmentation(outcome: &'static str) {
    counter!(PERMISSION_AUGMENTATIONS_TOTAL, "outcome" => outcome).increment(1);
}
