//! Configuration schema
//!
//! [`ConfigFile`] mirrors the YAML document; every field is optional and
//! falls back to the built-in Konami defaults. [`Settings`] is the resolved
//! runtime form the detector is built from.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::effect::{EffectConfig, SessionPolicy};
use crate::error::ConfigError;
use crate::matcher::RestartPolicy;
use crate::surface::OverlayNode;
use crate::token::{KeyToken, konami_sequence};

// ============================================================================
// File Schema
// ============================================================================

/// Top-level YAML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Target sequence; arrow aliases (`up`, `Left`) are normalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<String>>,

    /// Cursor fallback on mismatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartPolicy>,

    /// Effect settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectSection>,
}

/// `effect:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectSection {
    /// Session lifetime as a humantime string (`2s`, `1500ms`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,

    /// What a new session does to live ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_policy: Option<SessionPolicy>,

    /// Overlay text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Overlay inline style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Style sheet inserted with each session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<String>,

    /// Root container animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_animation: Option<String>,

    /// Console line on session start; an empty string disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Runtime settings for one detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Target sequence.
    pub sequence: Vec<KeyToken>,
    /// Cursor fallback on mismatch.
    pub restart: RestartPolicy,
    /// Effect player configuration.
    pub effect: EffectConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sequence: konami_sequence(),
            restart: RestartPolicy::default(),
            effect: EffectConfig::default(),
        }
    }
}

impl Settings {
    /// Resolves a parsed file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `effect.lifetime` is not a
    /// valid duration.
    pub fn from_file(file: &ConfigFile) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(sequence) = &file.sequence {
            settings.sequence = sequence.iter().map(|s| KeyToken::parse(s)).collect();
        }
        if let Some(restart) = file.restart {
            settings.restart = restart;
        }

        if let Some(effect) = &file.effect {
            let target = &mut settings.effect;
            if let Some(lifetime) = &effect.lifetime {
                target.lifetime = parse_lifetime(lifetime)?;
            }
            if let Some(policy) = effect.session_policy {
                target.session_policy = policy;
            }
            if let Some(content) = &effect.content {
                target.overlay.content.clone_from(content);
            }
            if let Some(style) = &effect.style {
                target.overlay.style.clone_from(style);
            }
            if let Some(keyframes) = &effect.keyframes {
                target.keyframes.clone_from(keyframes);
            }
            if let Some(animation) = &effect.root_animation {
                target.root_animation.clone_from(animation);
            }
            if let Some(line) = &effect.announcement {
                target.announcement = (!line.is_empty()).then(|| line.clone());
            }
        }

        Ok(settings)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(sequence) = &overrides.sequence {
            self.sequence = sequence.iter().map(|s| KeyToken::parse(s)).collect();
        }
        if let Some(restart) = overrides.restart {
            self.restart = restart;
        }
        if let Some(lifetime) = overrides.lifetime {
            self.effect.lifetime = lifetime;
        }
        if let Some(policy) = overrides.session_policy {
            self.effect.session_policy = policy;
        }
        self
    }

    /// Overlay node sessions will insert.
    #[must_use]
    pub const fn overlay(&self) -> &OverlayNode {
        &self.effect.overlay
    }
}

/// Values supplied on the command line, each replacing its file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Replacement target sequence.
    pub sequence: Option<Vec<String>>,
    /// Replacement restart policy.
    pub restart: Option<RestartPolicy>,
    /// Replacement lifetime.
    pub lifetime: Option<Duration>,
    /// Replacement session policy.
    pub session_policy: Option<SessionPolicy>,
}

/// Parses a humantime lifetime string.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything humantime rejects.
pub fn parse_lifetime(s: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(s.trim()).map_err(|e| ConfigError::InvalidValue {
        field: "effect.lifetime".to_string(),
        value: s.to_string(),
        expected: format!("a duration like '2s' or '1500ms' ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let file: ConfigFile = serde_yaml::from_str("{}").unwrap();
        let settings = Settings::from_file(&file).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.sequence.len(), 10);
        assert_eq!(settings.effect.lifetime, Duration::from_millis(2000));
    }

    #[test]
    fn test_full_file_resolves() {
        let yaml = r"
sequence: [up, down, x]
restart: strict
effect:
  lifetime: 1500ms
  session_policy: replace
  content: hello
  style: 'color: red'
  keyframes: '@keyframes k {}'
  root_animation: k 1s
  announcement: ''
";
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let s = Settings::from_file(&file).unwrap();
        assert_eq!(
            s.sequence,
            vec![
                KeyToken::new("ArrowUp"),
                KeyToken::new("ArrowDown"),
                KeyToken::new("x")
            ]
        );
        assert_eq!(s.restart, RestartPolicy::Strict);
        assert_eq!(s.effect.lifetime, Duration::from_millis(1500));
        assert_eq!(s.effect.session_policy, SessionPolicy::Replace);
        assert_eq!(s.overlay().content, "hello");
        assert_eq!(s.overlay().style, "color: red");
        assert_eq!(s.effect.keyframes, "@keyframes k {}");
        assert_eq!(s.effect.root_animation, "k 1s");
        assert_eq!(s.effect.announcement, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ConfigFile, _> = serde_yaml::from_str("sequense: [a]");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_lifetime_is_invalid_value() {
        let file = ConfigFile {
            effect: Some(EffectSection {
                lifetime: Some("soon".to_string()),
                ..EffectSection::default()
            }),
            ..ConfigFile::default()
        };
        let err = Settings::from_file(&file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "effect.lifetime"));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let overrides = Overrides {
            sequence: Some(vec!["a".to_string(), "b".to_string()]),
            restart: Some(RestartPolicy::FirstToken),
            lifetime: Some(Duration::from_millis(50)),
            session_policy: Some(SessionPolicy::Replace),
        };
        let s = Settings::default().with_overrides(&overrides);
        assert_eq!(s.sequence, vec![KeyToken::new("a"), KeyToken::new("b")]);
        assert_eq!(s.restart, RestartPolicy::FirstToken);
        assert_eq!(s.effect.lifetime, Duration::from_millis(50));
        assert_eq!(s.effect.session_policy, SessionPolicy::Replace);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let s = Settings::default().with_overrides(&Overrides::default());
        assert_eq!(s, Settings::default());
    }
}
