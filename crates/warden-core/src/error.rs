//! Error types for Warden.
//!
//! [`WardenError`] is the error surfaced at the HTTP boundary. Every variant
//! maps to an [`ErrorCategory`], a default status code and a machine-readable
//! code, and renders into the JSON [`ErrorEnvelope`]:
//!
//! ```json
//! {"error": {"code": "ACCESS_DENIED", "message": "Access denied", "category": "authorization"}}
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`WardenError`].
pub type WardenResult<T> = Result<T, WardenError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Permission denied.
    Authorization,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Warden.
///
/// The two denial variants are deliberately separate: [`WardenError::AccessDenied`]
/// is raised while the caller's identity is being augmented, and
/// [`WardenError::Authorization`] when a declared requirement is not met.
///
/// # Example
///
/// ```
/// use warden_core::{ErrorCategory, WardenError};
///
/// let err = WardenError::access_denied("User 'sub' claim is required");
/// assert_eq!(err.category(), ErrorCategory::Authorization);
/// assert_eq!(err.status_code().as_u16(), 403);
/// ```
#[derive(Error, Debug)]
pub enum WardenError {
    /// The caller's permissions could not be established.
    #[error("{message}")]
    AccessDenied {
        /// Message returned to the caller.
        message: String,
    },

    /// A permission requirement was not satisfied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
        /// The operation that was denied.
        operation_id: Option<String>,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: anyhow::Error,
    },
}

impl WardenError {
    /// Creates an access denied error carrying the caller-facing message verbatim.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates an authorization error with operation context.
    #[must_use]
    pub fn authorization_for_operation(
        message: impl Into<String>,
        operation_id: impl Into<String>,
    ) -> Self {
        Self::Authorization {
            message: message.into(),
            operation_id: Some(operation_id.into()),
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::AccessDenied { .. } | Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::Authorization { .. } => "AUTHORIZATION_DENIED",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the message shown to the caller.
    ///
    /// Internal errors never expose their message or source.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::AccessDenied { message }
            | Self::Authorization { message, .. } => message,
            Self::Internal { .. } => "Internal server error",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.public_message().to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Authorization {
                operation_id: Some(op),
                ..
            } => Some(serde_json::json!({ "operation_id": op })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_keeps_message_verbatim() {
        let error = WardenError::access_denied("User 'sub' claim is required");
        assert_eq!(error.to_string(), "User 'sub' claim is required");
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);

        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.code, "ACCESS_DENIED");
        assert_eq!(envelope.error.message, "User 'sub' claim is required");
    }

    #[test]
    fn test_authorization_error_details() {
        let error = WardenError::authorization_for_operation("Access denied", "deleteUser");
        assert_eq!(error.category(), ErrorCategory::Authorization);

        let envelope = error.to_envelope(Some("req-1"));
        assert_eq!(envelope.error.code, "AUTHORIZATION_DENIED");
        assert_eq!(envelope.error.details.unwrap()["operation_id"], "deleteUser");
    }

    #[test]
    fn test_internal_error_hides_source() {
        let error = WardenError::internal_with_source(
            "lookup pool exhausted",
            anyhow::anyhow!("connection refused"),
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&error).is_some());

        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.message, "Internal server error");
    }

    #[test]
    fn test_error_envelope_serialization() {
        let error = WardenError::access_denied("Access denied");
        let json = serde_json::to_string(&error.to_envelope(Some("req-456")))
            .expect("serialization should work");
        assert!(json.contains("\"code\":\"ACCESS_DENIED\""));
        assert!(json.contains("\"request_id\":\"req-456\""));
        assert!(json.contains("\"category\":\"authorization\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        assert_eq!(
            ErrorCategory::Authorization.default_status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCategory::Internal.default_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
