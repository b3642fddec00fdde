//! Configuration loader
//!
//! Loading runs in stages:
//! 1. Size check against [`ConfigLimits`]
//! 2. Environment variable expansion on the raw text
//! 3. YAML parsing
//! 4. Deserialization to [`ConfigFile`]
//! 5. Validation
//! 6. Resolution to runtime [`Settings`]

use std::path::Path;

use crate::config::schema::{ConfigFile, Settings};
use crate::config::validation::Validator;
use crate::error::ConfigError;

/// Looks up an environment variable by name.
pub type EnvLookup = fn(&str) -> Option<String>;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Limits for configuration size.
    pub config_limits: ConfigLimits,

    /// Source of `${VAR}` values.
    pub env: EnvLookup,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            config_limits: ConfigLimits::default(),
            env: process_env,
        }
    }
}

/// Limits applied before a file is parsed.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("CHEATCODE_MAX_CONFIG_SIZE", 64 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated settings.
    pub settings: Settings,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads, validates, and resolves a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A referenced environment variable is not set
    /// - YAML parsing fails or the file is empty
    /// - Validation reports errors
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let limit = self.options.config_limits.max_config_size;
        if metadata.len() > limit {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw, path)
    }

    /// Runs every stage after the read on already-loaded text.
    ///
    /// `path` labels errors and warnings.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus the file-system failures.
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let expanded = substitute(raw, self.options.env)?;

        let root: serde_yaml::Value =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "configuration file is empty".to_string(),
            });
        }

        let file: ConfigFile =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        let result = Validator::new().validate(&file);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                issues: result.into_issues(),
            });
        }

        let warnings = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect();

        Ok(LoadResult {
            settings: Settings::from_file(&file)?,
            warnings,
        })
    }
}

// ============================================================================
// Environment Substitution
// ============================================================================

/// Expands environment references in raw YAML text.
///
/// Supports:
/// - `${VAR}`: the variable's value; an error if unset
/// - `${VAR:-default}`: `default` if unset
/// - `$$`: literal `$`
///
/// Any other `$` is kept as is.
fn substitute(raw: &str, env: EnvLookup) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line += 1;
                result.push(c);
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                result.push('$');
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let reference =
                    read_until_close(&mut chars).ok_or_else(|| ConfigError::InvalidValue {
                        field: format!("line {line}"),
                        value: "${".to_string(),
                        expected: "a closing '}' for the environment reference".to_string(),
                    })?;
                let (name, default) = match reference.split_once(":-") {
                    Some((name, default)) => (name, Some(default)),
                    None => (reference.as_str(), None),
                };
                match (env(name), default) {
                    (Some(value), _) => result.push_str(&value),
                    (None, Some(default)) => result.push_str(default),
                    (None, None) => {
                        return Err(ConfigError::EnvVarNotSet {
                            var: name.to_string(),
                            line,
                        });
                    }
                }
            }
            _ => result.push(c),
        }
    }

    Ok(result)
}

/// Reads up to the matching `}`; `None` if the text ends first.
fn read_until_close(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut value = String::new();
    let mut depth = 1;

    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(value);
                }
            }
            '\n' => return None,
            _ => {}
        }
        value.push(c);
    }

    None
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use tokio_test::assert_ok;

    use super::*;
    use crate::effect::SessionPolicy;
    use crate::token::KeyToken;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "EGG_CONTENT" => Some("secret found".to_string()),
            "EGG_LIFETIME" => Some("750ms".to_string()),
            _ => None,
        }
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new(LoaderOptions {
            env: fake_env,
            ..LoaderOptions::default()
        })
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_substitution_simple() {
        let result = substitute("content: ${EGG_CONTENT}", fake_env).unwrap();
        assert_eq!(result, "content: secret found");
    }

    #[test]
    fn test_env_substitution_default() {
        let result = substitute("content: ${EGG_MISSING:-fallback}", fake_env).unwrap();
        assert_eq!(result, "content: fallback");
    }

    #[test]
    fn test_env_substitution_missing_reports_line() {
        let err = substitute("a: 1\nb: 2\ncontent: ${EGG_MISSING}", fake_env).unwrap_err();
        match err {
            ConfigError::EnvVarNotSet { var, line } => {
                assert_eq!(var, "EGG_MISSING");
                assert_eq!(line, 3);
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let result = substitute("content: $$100 and $5", fake_env).unwrap();
        assert_eq!(result, "content: $100 and $5");
    }

    #[test]
    fn test_env_substitution_unclosed() {
        let err = substitute("content: ${EGG_CONTENT\nnext: 1", fake_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_config_limits_default() {
        // CHEATCODE_MAX_CONFIG_SIZE is not set in the test environment
        assert_eq!(ConfigLimits::default().max_config_size, 64 * 1024);
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            "sequence: [up, down, b]\neffect:\n  lifetime: ${EGG_LIFETIME}\n  content: ${EGG_CONTENT}\n  session_policy: replace\n",
        );
        let result = assert_ok!(loader().load(file.path()));

        assert_eq!(result.settings.sequence[0], KeyToken::new("ArrowUp"));
        assert_eq!(result.settings.effect.lifetime, Duration::from_millis(750));
        assert_eq!(result.settings.overlay().content, "secret found");
        assert_eq!(result.settings.effect.session_policy, SessionPolicy::Replace);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_load_strips_bom() {
        let file = write_config("\u{feff}restart: strict\n");
        assert_ok!(loader().load(file.path()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = loader()
            .load(Path::new("/nonexistent/cheatcode.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_too_large() {
        let file = write_config("restart: strict\n# padding padding padding\n");
        let loader = ConfigLoader::new(LoaderOptions {
            config_limits: ConfigLimits { max_config_size: 8 },
            env: fake_env,
        });
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { limit: 8, .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_config("# nothing here\n");
        let err = loader().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_invalid_yaml_reports_line() {
        let file = write_config("sequence: [up\nrestart: : :\n");
        let err = loader().load(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_unknown_field() {
        let file = write_config("sequense: [up]\n");
        let err = loader().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_validation_errors() {
        let file = write_config("sequence: []\neffect:\n  lifetime: 0s\n");
        let err = loader().load(file.path()).unwrap_err();
        match err {
            ConfigError::ValidationError { issues, .. } => assert_eq!(issues.len(), 2),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_surfaces_warnings() {
        let result = assert_ok!(loader().load_str("sequence: [ArowUp, a]\n", Path::new("inline")));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some("sequence[0]"));
        assert!(result.warnings[0].to_string().contains("ArrowUp"));
    }
}
