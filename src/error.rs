//! Error types for `cheatcode`
//!
//! The detector and the effect player are infallible by design; the errors
//! here belong to the layers around them: configuration loading, matcher
//! construction, and the CLI's I/O.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `cheatcode` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, broken stdin)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `cheatcode` operations.
///
/// Aggregates the domain-specific errors and maps each of them to an
/// exit code.
#[derive(Debug, Error)]
pub enum CheatcodeError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target sequence could not be turned into a matcher
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CheatcodeError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Sequence(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Json(_) => ExitCode::ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(.issues))]
    ValidationError {
        /// Path (or label) of the configuration source
        path: String,
        /// Every issue found, errors and warnings alike
        issues: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at line {line})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// 1-based line of the reference
        line: usize,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(ToString::to_string)
        .collect();
    errors.join("; ")
}

// ============================================================================
// Sequence Errors
// ============================================================================

/// Errors raised while building a sequence matcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// The target sequence has no tokens, so it could never complete
    #[error("target sequence is empty")]
    EmptyTarget,
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "sequence[3]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `cheatcode` operations.
pub type Result<T> = std::result::Result<T, CheatcodeError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_sequence_error_exit_code() {
        let err: CheatcodeError = SequenceError::EmptyTarget.into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: CheatcodeError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: CheatcodeError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "sequence".to_string(),
            message: "sequence is empty".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(issue.to_string(), "error: sequence is empty at sequence");
    }

    #[test]
    fn test_validation_error_lists_only_errors() {
        let err = ConfigError::ValidationError {
            path: "egg.yaml".to_string(),
            issues: vec![
                ValidationIssue {
                    path: "effect.lifetime".to_string(),
                    message: "lifetime must be greater than zero".to_string(),
                    severity: Severity::Error,
                },
                ValidationIssue {
                    path: "effect.content".to_string(),
                    message: "overlay content is empty".to_string(),
                    severity: Severity::Warning,
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("egg.yaml"));
        assert!(text.contains("greater than zero"));
        assert!(!text.contains("overlay content"));
    }

    #[test]
    fn test_env_var_display() {
        let err = ConfigError::EnvVarNotSet {
            var: "EGG_CONTENT".to_string(),
            line: 4,
        };
        assert!(err.to_string().contains("EGG_CONTENT"));
        assert!(err.to_string().contains("line 4"));
    }
}
