//! Configuration module
//!
//! Loads and validates detector configuration files and merges command-line
//! overrides on top.

pub mod loader;
pub mod schema;
pub mod validation;

use std::path::Path;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::{ConfigFile, EffectSection, Overrides, Settings, parse_lifetime};
pub use validation::{ValidationResult, Validator};

use crate::error::ConfigError;

/// Builds runtime settings from an optional file plus overrides.
///
/// Without a file the built-in defaults are used. The merged result is
/// validated again, since overrides bypass the file checks.
///
/// # Errors
///
/// Returns any error raised while loading `path`, or
/// [`ConfigError::ValidationError`] if the merged settings are unusable.
pub fn resolve(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<(Settings, Vec<LoadWarning>), ConfigError> {
    let (settings, warnings) = match path {
        Some(path) => {
            let loaded = ConfigLoader::with_defaults().load(path)?;
            (loaded.settings, loaded.warnings)
        }
        None => (Settings::default(), Vec::new()),
    };
    let settings = settings.with_overrides(overrides);

    let result = Validator::new().validate_settings(&settings);
    if result.has_errors() {
        let source = path.map_or_else(
            || OVERRIDES_SOURCE.to_string(),
            |p| format!("{} with {OVERRIDES_SOURCE}", p.display()),
        );
        return Err(ConfigError::ValidationError {
            path: source,
            issues: result.into_issues(),
        });
    }
    Ok((settings, warnings))
}

/// Label for values that came from flags rather than a file.
const OVERRIDES_SOURCE: &str = "command-line overrides";

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let (settings, warnings) = resolve(None, &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_applies_overrides_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("egg.yaml");
        std::fs::write(&path, "effect:\n  lifetime: 5s\n").unwrap();

        let overrides = Overrides {
            lifetime: Some(Duration::from_millis(100)),
            ..Overrides::default()
        };
        let (settings, _) = resolve(Some(&path), &overrides).unwrap();
        assert_eq!(settings.effect.lifetime, Duration::from_millis(100));
    }

    #[test]
    fn test_resolve_rejects_zero_lifetime_override() {
        let overrides = Overrides {
            lifetime: Some(Duration::ZERO),
            ..Overrides::default()
        };
        match resolve(None, &overrides) {
            Err(ConfigError::ValidationError { path, issues }) => {
                assert_eq!(path, OVERRIDES_SOURCE);
                assert_eq!(issues[0].path, "effect.lifetime");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_rejects_blank_sequence_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("egg.yaml");
        std::fs::write(&path, "sequence: [up, b]\n").unwrap();

        let overrides = Overrides {
            sequence: Some(vec![String::new()]),
            ..Overrides::default()
        };
        match resolve(Some(&path), &overrides) {
            Err(ConfigError::ValidationError { path, issues }) => {
                assert!(path.ends_with("with command-line overrides"));
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "sequence[0]");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }
}
