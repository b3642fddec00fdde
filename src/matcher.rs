//! Input sequence matcher.
//!
//! [`SequenceMatcher`] holds a fixed target sequence and a cursor counting
//! how many leading target tokens the most recent input has matched. Each
//! call to [`feed`](SequenceMatcher::feed) consumes exactly one token.
//!
//! What happens on a mismatch is chosen by [`RestartPolicy`]:
//!
//! | Policy        | Cursor after a mismatching token                    |
//! |---------------|-----------------------------------------------------|
//! | `Strict`      | always 0                                            |
//! | `FirstToken`  | 1 if the token equals the first target token, else 0 |
//! | `Overlap`     | longest target prefix that ends the input so far    |
//!
//! Only `Overlap` finds `up up up down down ...` (an extra leading `up`).
//! It is computed from a prefix-function table built once per matcher.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::SequenceError;
use crate::token::KeyToken;

/// How the cursor falls back when a token breaks the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Restart from zero on any mismatch.
    Strict,
    /// Restart from zero, or from one when the token opens the target.
    FirstToken,
    /// Restart from the longest target prefix that is still matched.
    #[default]
    Overlap,
}

impl std::fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Strict => "strict",
            Self::FirstToken => "first-token",
            Self::Overlap => "overlap",
        };
        f.write_str(name)
    }
}

/// Result of feeding one token to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The token continued the match; `cursor` is the new position.
    Advanced {
        /// Number of target tokens now matched
        cursor: usize,
    },
    /// The token broke the match; `cursor` is where matching restarts.
    Reset {
        /// Number of target tokens still matched after the fallback
        cursor: usize,
    },
    /// The token completed the target. The cursor is back at 0.
    Completed,
}

impl MatchOutcome {
    /// Returns `true` when the outcome completed the target sequence.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Matches a stream of key tokens against one fixed target sequence.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    target: Vec<KeyToken>,
    /// `fallback[i]`: length of the longest proper prefix of
    /// `target[..=i]` that is also its suffix.
    fallback: Vec<usize>,
    cursor: usize,
    policy: RestartPolicy,
}

impl SequenceMatcher {
    /// Builds a matcher for `target` with the given restart policy.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::EmptyTarget`] if `target` has no tokens.
    pub fn new(target: Vec<KeyToken>, policy: RestartPolicy) -> Result<Self, SequenceError> {
        if target.is_empty() {
            return Err(SequenceError::EmptyTarget);
        }
        let fallback = prefix_function(&target);
        Ok(Self {
            target,
            fallback,
            cursor: 0,
            policy,
        })
    }

    /// Consumes one token and reports how the cursor moved.
    pub fn feed(&mut self, token: &KeyToken) -> MatchOutcome {
        if *token == self.target[self.cursor] {
            self.cursor += 1;
            if self.cursor == self.target.len() {
                trace!(token = %token, "target sequence completed");
                self.cursor = 0;
                return MatchOutcome::Completed;
            }
            return MatchOutcome::Advanced {
                cursor: self.cursor,
            };
        }

        let previous = self.cursor;
        self.cursor = self.restart_point(token);
        trace!(token = %token, from = previous, to = self.cursor, "match broken");
        MatchOutcome::Reset {
            cursor: self.cursor,
        }
    }

    /// Computes the cursor after `token` failed to match `target[cursor]`.
    fn restart_point(&self, token: &KeyToken) -> usize {
        match self.policy {
            RestartPolicy::Strict => 0,
            RestartPolicy::FirstToken => usize::from(*token == self.target[0]),
            RestartPolicy::Overlap => {
                let mut k = self.cursor;
                while k > 0 {
                    k = self.fallback[k - 1];
                    if *token == self.target[k] {
                        return k + 1;
                    }
                }
                usize::from(*token == self.target[0])
            }
        }
    }

    /// Returns the number of leading target tokens currently matched.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the target sequence.
    #[must_use]
    pub fn target(&self) -> &[KeyToken] {
        &self.target
    }

    /// Returns the target length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Always `false`: a matcher cannot be built from an empty target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Returns the restart policy.
    #[must_use]
    pub const fn policy(&self) -> RestartPolicy {
        self.policy
    }

    /// Drops any partial match.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Classic prefix function over token equality.
fn prefix_function(target: &[KeyToken]) -> Vec<usize> {
    let mut table = vec![0; target.len()];
    let mut k = 0;
    for i in 1..target.len() {
        while k > 0 && target[i] != target[k] {
            k = table[k - 1];
        }
        if target[i] == target[k] {
            k += 1;
        }
        table[i] = k;
    }
    table
}
