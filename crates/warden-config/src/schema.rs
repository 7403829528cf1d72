//! Configuration schema types.
//!
//! Every section rejects unknown fields and falls back to defaults for
//! missing ones.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_telemetry::{LogConfig, MetricsConfig, TelemetryConfig, TracingConfig};

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus exporter.
    #[serde(default)]
    pub enabled: bool,

    /// Prometheus listener address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

/// Tracing section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TracingSection {
    /// Export spans over OTLP.
    #[serde(default)]
    pub enabled: bool,

    /// OTLP exporter endpoint (e.g., `http://localhost:4317`).
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Sampling ratio (0.0 to 1.0).
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

impl Default for TracingSection {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: None,
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

fn default_sampling_ratio() -> f64 {
    1.0
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Install the log subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// ANSI colors (pretty format only).
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Source file and line in each event.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name attached to exported spans.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service version.
    #[serde(default)]
    pub service_version: Option<String>,

    /// Deployment environment.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,

    /// Span export settings.
    #[serde(default)]
    pub tracing: TracingSection,

    /// Log settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            environment: default_environment(),
            metrics: MetricsSection::default(),
            tracing: TracingSection::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl TelemetrySection {
    /// Converts the section into the settings `warden-telemetry` installs.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let logging = LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: self.logging.format == LogFormat::Json,
            span_events: false,
            file_line_info: self.logging.include_location,
            ansi: self.logging.ansi_enabled,
            include_target: true,
        };

        let metrics = MetricsConfig {
            enabled: self.metrics.enabled,
            addr: self.metrics.addr.clone(),
        };

        let mut tracing = TracingConfig {
            enabled: self.tracing.enabled,
            sample_ratio: self.tracing.sampling_ratio,
            ..TracingConfig::default()
        };
        if let Some(endpoint) = &self.tracing.otlp_endpoint {
            tracing.otlp_endpoint.clone_from(endpoint);
        }

        let version = self
            .service_version
            .clone()
            .unwrap_or_else(|| tracing.service_version.clone());

        TelemetryConfig {
            logging,
            metrics,
            tracing,
        }
        .with_service(self.service_name.clone(), version, self.environment.clone())
    }
}

fn default_service_name() -> String {
    "warden".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Authentication section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthenticationSection {
    /// Header carrying the upstream-verified claims.
    #[serde(default = "default_claims_header")]
    pub claims_header: String,

    /// Authentication type recorded on the caller's identity.
    #[serde(default = "default_authentication_type")]
    pub authentication_type: String,
}

impl Default for AuthenticationSection {
    fn default() -> Self {
        Self {
            claims_header: default_claims_header(),
            authentication_type: default_authentication_type(),
        }
    }
}

fn default_claims_header() -> String {
    "x-authenticated-claims".to_string()
}

fn default_authentication_type() -> String {
    "Bearer".to_string()
}

/// Permissions lookup section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PermissionsSection {
    /// Upper bound on a single permission lookup, in milliseconds.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,

    /// Seed the in-memory store with the demo grants (`alice`, `bob`).
    #[serde(default)]
    pub seed_demo_grants: bool,
}

impl Default for PermissionsSection {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout(),
            seed_demo_grants: false,
        }
    }
}

impl PermissionsSection {
    /// The lookup timeout as a [`Duration`].
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

fn default_lookup_timeout() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_section_defaults() {
        let section = TelemetrySection::default();
        assert_eq!(section.service_name, "warden");
        assert!(!section.metrics.enabled);
        assert!(!section.tracing.enabled);
        assert!(section.logging.enabled);
        assert_eq!(section.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<PermissionsSection, _> = toml::from_str(
            r"
            lookup_timeout_ms = 500
            retries = 3
            ",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let section: AuthenticationSection =
            toml::from_str(r#"claims_header = "x-upstream-claims""#).unwrap();
        assert_eq!(section.claims_header, "x-upstream-claims");
        assert_eq!(section.authentication_type, "Bearer");
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_to_telemetry_config() {
        let section = TelemetrySection {
            service_name: "orders-api".to_string(),
            service_version: Some("3.0.0".to_string()),
            environment: "staging".to_string(),
            tracing: TracingSection {
                enabled: true,
                otlp_endpoint: Some("http://collector:4317".to_string()),
                sampling_ratio: 0.5,
            },
            logging: LoggingSection {
                format: LogFormat::Pretty,
                ..LoggingSection::default()
            },
            ..TelemetrySection::default()
        };

        let config = section.to_telemetry_config();
        assert!(!config.logging.json_format);
        assert!(config.tracing.enabled);
        assert_eq!(config.tracing.otlp_endpoint, "http://collector:4317");
        assert_eq!(config.tracing.service_name, "orders-api");
        assert_eq!(config.tracing.service_version, "3.0.0");
        assert_eq!(config.tracing.environment, "staging");
    }

    #[test]
    fn test_lookup_timeout_duration() {
        let section = PermissionsSection::default();
        assert_eq!(section.lookup_timeout(), Duration::from_secs(2));
    }
}
