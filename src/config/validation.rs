//! Configuration validation
//!
//! Semantic checks on a parsed [`ConfigFile`], and on the merged
//! [`Settings`] once command-line overrides are applied. The validator
//! collects every issue instead of stopping at the first one.

use std::time::Duration;

use crate::config::schema::{ConfigFile, Settings, parse_lifetime};
use crate::error::{Severity, ValidationIssue};
use crate::token::suggest_key;

/// Lifetimes above this draw a warning.
const LONG_LIFETIME: Duration = Duration::from_secs(60);

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All issues, errors first.
    #[must_use]
    pub fn into_issues(self) -> Vec<ValidationIssue> {
        let mut issues = self.errors;
        issues.extend(self.warnings);
        issues
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &ConfigFile) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_sequence(config);
        self.validate_effect(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    /// Validates runtime settings after overrides were merged in.
    ///
    /// Only hard errors are checked here; the file pass already reported
    /// its warnings.
    pub fn validate_settings(&mut self, settings: &Settings) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        if settings.sequence.is_empty() {
            self.add_error("sequence", "sequence is empty and could never match");
        }
        for (i, key) in settings.sequence.iter().enumerate() {
            if key.as_str().trim().is_empty() {
                self.add_error(&format!("sequence[{i}]"), "key name is blank");
            }
        }
        if settings.effect.lifetime.is_zero() {
            self.add_error("effect.lifetime", "lifetime must be greater than zero");
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_sequence(&mut self, config: &ConfigFile) {
        let Some(sequence) = &config.sequence else {
            return;
        };

        if sequence.is_empty() {
            self.add_error("sequence", "sequence is empty and could never match");
            return;
        }

        for (i, key) in sequence.iter().enumerate() {
            let path = format!("sequence[{i}]");
            if key.trim().is_empty() {
                self.add_error(&path, "key name is blank");
            } else if let Some(suggestion) = suggest_key(key.trim()) {
                self.add_warning(
                    &path,
                    &format!("unknown key '{key}', did you mean '{suggestion}'?"),
                );
            }
        }
    }

    fn validate_effect(&mut self, config: &ConfigFile) {
        let Some(effect) = &config.effect else {
            return;
        };

        if let Some(lifetime) = &effect.lifetime {
            match parse_lifetime(lifetime) {
                Ok(d) if d.is_zero() => {
                    self.add_error("effect.lifetime", "lifetime must be greater than zero");
                }
                Ok(d) if d > LONG_LIFETIME => {
                    self.add_warning(
                        "effect.lifetime",
                        &format!(
                            "lifetime {lifetime} is unusually long (> {})",
                            humantime::format_duration(LONG_LIFETIME)
                        ),
                    );
                }
                Ok(_) => {}
                Err(e) => self.add_error("effect.lifetime", &e.to_string()),
            }
        }

        if effect.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.add_warning("effect.content", "overlay content is empty");
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
