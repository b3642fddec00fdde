//! Key-press tokens.
//!
//! A [`KeyToken`] is the stable identifier of one physical key, spelled the
//! way browsers report `KeyboardEvent.key` (`"ArrowUp"`, `"b"`, `"Enter"`).
//! Comparison is exact and case-sensitive.

use serde::{Deserialize, Serialize};

/// Arrow-key aliases accepted on input, mapped to their canonical names.
const ARROW_ALIASES: [(&str, &str); 4] = [
    ("up", "ArrowUp"),
    ("down", "ArrowDown"),
    ("left", "ArrowLeft"),
    ("right", "ArrowRight"),
];

/// Canonical names of the keys the default target is built from.
pub const KNOWN_KEYS: [&str; 6] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "b", "a"];

/// Shorter tokens sit within typo distance of `up` by accident.
const MIN_SUGGEST_LEN: usize = 3;

/// One discrete key-press identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyToken(String);

impl KeyToken {
    /// Creates a token from its canonical spelling, verbatim.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Creates a token from user input, normalizing arrow aliases.
    ///
    /// `up`, `Up` and `ArrowUp` all become `ArrowUp` (likewise for the
    /// other three arrows). Anything else is kept as typed.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let canonical = ARROW_ALIASES
            .iter()
            .find(|(alias, name)| trimmed.eq_ignore_ascii_case(alias) || trimmed == *name)
            .map_or(trimmed, |(_, name)| name);
        Self(canonical.to_string())
    }

    /// Returns the token's identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KeyToken {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// The Konami code: up up down down left right left right b a.
#[must_use]
pub fn konami_sequence() -> Vec<KeyToken> {
    [
        "ArrowUp",
        "ArrowUp",
        "ArrowDown",
        "ArrowDown",
        "ArrowLeft",
        "ArrowRight",
        "ArrowLeft",
        "ArrowRight",
        "b",
        "a",
    ]
    .into_iter()
    .map(KeyToken::new)
    .collect()
}

/// Splits one line of input into tokens.
///
/// Tokens are whitespace separated; a line whose first non-blank character
/// is `#` is a comment and yields nothing.
#[must_use]
pub fn parse_line(line: &str) -> Vec<KeyToken> {
    let line = line.trim();
    if line.starts_with('#') {
        return Vec::new();
    }
    line.split_whitespace().map(KeyToken::parse).collect()
}

/// Suggests a canonical key name for a token that looks like a typo.
///
/// Returns the closest known key or arrow alias when the token is not
/// already canonical and its Damerau-Levenshtein distance is small for its
/// length: at most 1 for tokens of up to four characters, at most 2 beyond.
/// Tokens shorter than three characters never get a suggestion.
#[must_use]
pub fn suggest_key(input: &str) -> Option<&'static str> {
    let len = input.chars().count();
    if KNOWN_KEYS.contains(&input) || len < MIN_SUGGEST_LEN {
        return None;
    }
    let max_distance = if len <= 4 { 1 } else { 2 };
    let lowered = input.to_ascii_lowercase();
    if ARROW_ALIASES.iter().any(|(alias, _)| *alias == lowered) {
        return None;
    }
    ARROW_ALIASES
        .iter()
        .flat_map(|(alias, name)| [(*alias, *name), (*name, *name)])
        .map(|(candidate, name)| (name, strsim::damerau_levenshtein(input, candidate)))
        .filter(|(_, dist)| *dist <= max_distance)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name)
}
