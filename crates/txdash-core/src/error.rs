//! Error types for txdash-core
//!
//! Gateway failures are never fatal: the synchronization controller keeps
//! the previous display values and reports the failure through an
//! [`ErrorLogger`]. The remaining variants cover input validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::Endpoint;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Connection, timeout or I/O failure
    TransportError,
    /// Service answered with a non-success status
    StatusError,
    /// Response body could not be decoded
    MalformedResponse,
    /// Unrecognized month name
    InvalidMonth,
    /// Invalid input
    ValidationError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
            ErrorCode::StatusError => write!(f, "STATUS_ERROR"),
            ErrorCode::MalformedResponse => write!(f, "MALFORMED_RESPONSE"),
            ErrorCode::InvalidMonth => write!(f, "INVALID_MONTH"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - display may be stale
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl ErrorSeverity {
    /// Log level a failure of this severity is reported at
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Failure of a single remote query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },

    #[error("{endpoint} returned status {status}: {body}")]
    Status { endpoint: Endpoint, status: u16, body: String },

    #[error("Malformed response from {endpoint}: {message}")]
    Malformed { endpoint: Endpoint, message: String },
}

impl GatewayError {
    /// Endpoint the failed query targeted
    pub fn endpoint(&self) -> Endpoint {
        match self {
            GatewayError::Transport { endpoint, .. }
            | GatewayError::Status { endpoint, .. }
            | GatewayError::Malformed { endpoint, .. } => *endpoint,
        }
    }
}

/// Main error type for txdash-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid month: {value}")]
    InvalidMonth { value: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Gateway(GatewayError::Transport { .. }) => ErrorCode::TransportError,
            CoreError::Gateway(GatewayError::Status { .. }) => ErrorCode::StatusError,
            CoreError::Gateway(GatewayError::Malformed { .. }) => ErrorCode::MalformedResponse,
            CoreError::InvalidMonth { .. } => ErrorCode::InvalidMonth,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Gateway(_) => ErrorSeverity::Warning,
            CoreError::InvalidMonth { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. } => ErrorSeverity::Info,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Gateway(GatewayError::Transport { endpoint, .. }) => {
                details = details.with_detail(serde_json::json!({ "endpoint": endpoint.path() }));
                details = details.with_suggestion(
                    "Check that the transaction service is running and reachable.".to_string()
                );
            }
            CoreError::Gateway(GatewayError::Status { endpoint, status, .. }) => {
                details = details.with_detail(serde_json::json!({
                    "endpoint": endpoint.path(),
                    "status": status,
                }));
            }
            CoreError::Gateway(GatewayError::Malformed { endpoint, .. }) => {
                details = details.with_detail(serde_json::json!({ "endpoint": endpoint.path() }));
                details = details.with_suggestion(
                    "Check that service.base_url points at the transaction service.".to_string()
                );
            }
            CoreError::InvalidMonth { .. } => {
                details = details.with_suggestion(
                    "Use a full English month name such as \"March\".".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Fetch cycle the failure belongs to
    pub cycle: Option<u64>,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            cycle: None,
            data: serde_json::json!({}),
        }
    }

    /// Attach the cycle token
    pub fn with_cycle(mut self, token: u64) -> Self {
        self.cycle = Some(token);
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Observability sink for absorbed failures
pub trait ErrorLogger: Send + Sync {
    /// Report an absorbed failure
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl DefaultErrorLogger {
    /// Level and message written for `error`
    fn entry(error: &CoreError, context: &ErrorContext) -> (log::Level, String) {
        let severity = error.severity();
        let message = format!(
            "{} {} - Operation: {} - Cycle: {:?} - Data: {}",
            severity.to_string().to_uppercase(),
            error.to_details(),
            context.operation,
            context.cycle,
            context.data
        );
        (severity.log_level(), message)
    }
}

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let (level, message) = Self::entry(error, context);
        log::log!(target: "txdash::error", level, "{}", message);
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::TransportError.to_string(), "TRANSPORT_ERROR");
        assert_eq!(ErrorCode::MalformedResponse.to_string(), "MALFORMED_RESPONSE");
        assert_eq!(ErrorCode::InvalidMonth.to_string(), "INVALID_MONTH");
    }

    #[test]
    fn test_gateway_error_codes() {
        let error: CoreError = GatewayError::Status {
            endpoint: Endpoint::Statistics,
            status: 503,
            body: "unavailable".to_string(),
        }
        .into();
        assert_eq!(error.code(), ErrorCode::StatusError);
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let error: CoreError = GatewayError::Malformed {
            endpoint: Endpoint::Histogram,
            message: "expected array".to_string(),
        }
        .into();
        assert_eq!(error.code(), ErrorCode::MalformedResponse);
    }

    #[test]
    fn test_gateway_error_endpoint() {
        let error = GatewayError::Transport {
            endpoint: Endpoint::Transactions,
            message: "connection refused".to_string(),
        };
        assert_eq!(error.endpoint(), Endpoint::Transactions);
        assert!(error.to_string().contains("/api/transactions"));
    }

    #[test]
    fn test_error_details_status() {
        let error = CoreError::from(GatewayError::Status {
            endpoint: Endpoint::Statistics,
            status: 500,
            body: String::new(),
        });
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::StatusError);
        let detail = details.details.unwrap();
        assert_eq!(detail["status"], 500);
        assert_eq!(detail["endpoint"], "/api/statistics");
    }

    #[test]
    fn test_error_details_invalid_month() {
        let error = CoreError::InvalidMonth { value: "Smarch".to_string() };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::InvalidMonth);
        assert!(details.message.contains("Smarch"));
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_severity_log_levels() {
        assert_eq!(ErrorSeverity::Info.log_level(), log::Level::Info);
        assert_eq!(ErrorSeverity::Warning.log_level(), log::Level::Warn);
        assert_eq!(ErrorSeverity::Critical.log_level(), log::Level::Error);
    }

    #[test]
    fn test_default_logger_reports_gateway_failure_as_warning() {
        let error = CoreError::from(GatewayError::Transport {
            endpoint: Endpoint::Histogram,
            message: "connection refused".to_string(),
        });
        let context = ErrorContext::new("fetch /api/bar-chart").with_cycle(4);

        let (level, message) = DefaultErrorLogger::entry(&error, &context);
        assert_eq!(level, log::Level::Warn);
        assert!(message.starts_with("WARNING [TRANSPORT_ERROR]"));
        assert!(message.contains("/api/bar-chart"));
        assert!(message.contains("Check that the transaction service is running"));
        assert!(message.contains("Cycle: Some(4)"));
    }

    #[test]
    fn test_default_logger_reports_internal_error_as_error() {
        let error = CoreError::InternalError { message: "task panicked".to_string() };

        let (level, message) = DefaultErrorLogger::entry(&error, &ErrorContext::new("fetch"));
        assert_eq!(level, log::Level::Error);
        assert!(message.starts_with("CRITICAL [INTERNAL_ERROR]"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("fetch_statistics")
            .with_cycle(7)
            .with_data("month", serde_json::json!("March"));

        assert_eq!(context.operation, "fetch_statistics");
        assert_eq!(context.cycle, Some(7));
        assert_eq!(context.data["month"], "March");
    }
}
