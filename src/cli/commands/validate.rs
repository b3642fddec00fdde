//! `validate` command
//!
//! Loads a configuration file through the full pipeline and reports every
//! issue found.

use serde_json::json;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::error::{CheatcodeError, ConfigError, Severity, ValidationIssue};

/// Validate one configuration file.
///
/// # Errors
///
/// Returns the load error when the file is unreadable, malformed, or has
/// validation errors. The report is printed before the error is returned.
pub fn run(args: &ValidateArgs) -> Result<(), CheatcodeError> {
    tracing::info!(file = %args.path.display(), "validating configuration");

    let result = ConfigLoader::with_defaults().load(&args.path);
    let path = args.path.display().to_string();

    match args.format {
        OutputFormat::Human => print_human(&path, &result),
        OutputFormat::Json => print_json(&path, &result),
    }

    result.map(|_| ()).map_err(Into::into)
}

fn print_human(path: &str, result: &Result<LoadResult, ConfigError>) {
    match result {
        Ok(loaded) => {
            for warning in &loaded.warnings {
                println!("  warning: {warning}");
            }
            println!("✓ {path} is valid ({} tokens)", loaded.settings.sequence.len());
        }
        Err(ConfigError::ValidationError { issues, .. }) => {
            for issue in issues {
                println!("  {issue}");
            }
            println!("✗ {path} is invalid");
        }
        Err(e) => println!("✗ {e}"),
    }
}

fn print_json(path: &str, result: &Result<LoadResult, ConfigError>) {
    let report = match result {
        Ok(loaded) => json!({
            "path": path,
            "valid": true,
            "errors": [],
            "warnings": loaded
                .warnings
                .iter()
                .map(|w| json!({ "path": w.location, "message": w.message }))
                .collect::<Vec<_>>(),
        }),
        Err(ConfigError::ValidationError { issues, .. }) => json!({
            "path": path,
            "valid": false,
            "errors": issues_json(issues, Severity::Error),
            "warnings": issues_json(issues, Severity::Warning),
        }),
        Err(e) => json!({
            "path": path,
            "valid": false,
            "errors": [{ "path": null, "message": e.to_string() }],
            "warnings": [],
        }),
    };
    println!("{report}");
}

fn issues_json(issues: &[ValidationIssue], severity: Severity) -> Vec<serde_json::Value> {
    issues
        .iter()
        .filter(|i| i.severity == severity)
        .map(|i| json!({ "path": i.path, "message": i.message }))
        .collect()
}
