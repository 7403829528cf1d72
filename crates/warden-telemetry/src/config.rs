//! Telemetry configuration.

use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;
use crate::tracing::TracingConfig;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,

    /// Span export configuration.
    pub tracing: TracingConfig,
}

impl TelemetryConfig {
    /// Pretty debug logs, no exporters.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Sets the service identity attached to exported spans.
    #[must_use]
    pub fn with_service(
        mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        self.tracing.service_name = name.into();
        self.tracing.service_version = version.into();
        self.tracing.environment = environment.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exports_nothing() {
        let config = TelemetryConfig::default();
        assert!(config.logging.enabled);
        assert!(!config.metrics.enabled);
        assert!(!config.tracing.enabled);
    }

    #[test]
    fn test_with_service() {
        let config = TelemetryConfig::development().with_service("orders-api", "1.4.0", "staging");
        assert_eq!(config.tracing.service_name, "orders-api");
        assert_eq!(config.tracing.service_version, "1.4.0");
        assert_eq!(config.tracing.environment, "staging");
        assert!(!config.logging.json_format);
    }
}
