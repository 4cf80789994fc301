//! Error types for ledgerdash-core
//!
//! Every failure is handed back to the caller unchanged; nothing in the core
//! retries. The API layer shows `to_string()` of these errors verbatim.

use ledgerdash_parser::ParseError as OutputParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// ledger could not run, failed, or wrote to stderr
    ProcessError,
    /// ledger output could not be read
    ParseError,
    /// Date text could not be read
    InvalidDate,
    /// One or more prefetch queries failed
    PrefetchFailed,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ProcessError => write!(f, "PROCESS_ERROR"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::InvalidDate => write!(f, "INVALID_DATE"),
            ErrorCode::PrefetchFailed => write!(f, "PREFETCH_FAILED"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
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

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for ledgerdash-core
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("{message}")]
    ProcessError { command: String, message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid date: {input}")]
    InvalidDate { input: String },

    #[error("{} of the prefetch queries failed: {}", .failures.len(), .failures.join("; "))]
    PrefetchFailed { failures: Vec<String> },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ProcessError { .. } => ErrorCode::ProcessError,
            CoreError::ParseError { .. } => ErrorCode::ParseError,
            CoreError::InvalidDate { .. } => ErrorCode::InvalidDate,
            CoreError::PrefetchFailed { .. } => ErrorCode::PrefetchFailed,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ProcessError { .. } => ErrorSeverity::Error,
            CoreError::ParseError { .. } => ErrorSeverity::Error,
            CoreError::InvalidDate { .. } => ErrorSeverity::Warning,
            CoreError::PrefetchFailed { .. } => ErrorSeverity::Warning,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ProcessError { command, .. } => {
                details = details
                    .with_detail(serde_json::json!({ "command": command }))
                    .with_suggestion(
                        "Check that ledger.exe_path points at the ledger executable.".to_string(),
                    )
                    .with_suggestion(
                        "Run the command above in a terminal to see ledger's own diagnostics."
                            .to_string(),
                    );
            }
            CoreError::ParseError { message } => {
                details = details
                    .with_detail(serde_json::json!({ "parse_message": message }))
                    .with_suggestion(
                        "Amounts must be in a single commodity; reports run with --basis."
                            .to_string(),
                    );
            }
            CoreError::InvalidDate { .. } => {
                details = details
                    .with_suggestion("Dates are written as YYYY, YYYY/M or YYYY/M/D.".to_string());
            }
            CoreError::PrefetchFailed { failures } => {
                details = details.with_detail(serde_json::json!({ "failures": failures }));
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<OutputParseError> for CoreError {
    fn from(error: OutputParseError) -> Self {
        CoreError::ParseError {
            message: error.to_string(),
        }
    }
}

// ==================== Tests ====================
