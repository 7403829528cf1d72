//! Root configuration type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use warden_authz::{PermissionRequirement, PolicyRegistry};

use crate::{AuthenticationSection, ConfigError, PermissionsSection, TelemetrySection};

/// Complete Warden configuration.
///
/// `policies` names requirements; `operations` binds operation ids to
/// policy names. A requirement string is either `and:<p1>,<p2>` or
/// `or:<p1>,<p2>`.
///
/// # Example
///
/// ```
/// use warden_config::WardenConfig;
///
/// let config: WardenConfig = toml::from_str(r#"
///     [policies]
///     "orders.write" = "and:create,update"
///     "orders.read" = "or:read,create"
///
///     [operations]
///     createOrder = "orders.write"
///     getOrder = "orders.read"
/// "#).unwrap();
///
/// config.validate().unwrap();
/// assert_eq!(config.operations["getOrder"], "orders.read");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Telemetry configuration (metrics, tracing, logging).
    #[serde(default)]
    pub telemetry: TelemetrySection,

    /// Authentication stage settings.
    #[serde(default)]
    pub authentication: AuthenticationSection,

    /// Permission lookup settings.
    #[serde(default)]
    pub permissions: PermissionsSection,

    /// Named permission requirements.
    #[serde(default)]
    pub policies: BTreeMap<String, PermissionRequirement>,

    /// Operation id to policy name.
    #[serde(default)]
    pub operations: BTreeMap<String, String>,
}

impl WardenConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The metrics address is invalid while metrics are enabled
    /// - The sampling ratio is not in 0.0..=1.0
    /// - The lookup timeout is zero
    /// - The claims header is not a valid header name
    /// - An operation is bound to an unknown policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry.metrics.enabled
            && self
                .telemetry
                .metrics
                .addr
                .parse::<std::net::SocketAddr>()
                .is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        if !(0.0..=1.0).contains(&self.telemetry.tracing.sampling_ratio) {
            return Err(ConfigError::invalid_value(
                "telemetry.tracing.sampling_ratio",
                "must be between 0.0 and 1.0",
            ));
        }

        if self.permissions.lookup_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "permissions.lookup_timeout_ms",
                "must be greater than zero",
            ));
        }

        let header = &self.authentication.claims_header;
        if header.is_empty()
            || !header
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ConfigError::invalid_value(
                "authentication.claims_header",
                format!("invalid header name: {header:?}"),
            ));
        }

        for (operation, policy) in &self.operations {
            if !self.policies.contains_key(policy) {
                return Err(ConfigError::invalid_value(
                    format!("operations.{operation}"),
                    format!("unknown policy '{policy}'"),
                ));
            }
        }

        Ok(())
    }

    /// Builds a policy registry from `policies`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Policy` if registration fails.
    pub fn policy_registry(&self) -> Result<PolicyRegistry, ConfigError> {
        let mut registry = PolicyRegistry::new();
        for (name, requirement) in &self.policies {
            registry.register(name.clone(), requirement.clone())?;
        }
        Ok(registry)
    }

    /// Development preset: pretty debug logs, demo grants seeded.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = crate::LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();
        config.permissions.seed_demo_grants = true;
        config
    }

    /// Production preset: JSON logs at info, metrics exported.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = crate::LogFormat::Json;
        config.telemetry.environment = "production".to_string();
        config.telemetry.metrics.enabled = true;
        config
    }
}
