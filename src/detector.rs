//! Detector: the component that owns the input loop.
//!
//! A [`Detector`] feeds every key token to its [`SequenceMatcher`] and calls
//! [`EffectPlayer::play`] each time the target sequence completes. Tokens
//! are handled one at a time through `&mut self`, so the cursor needs no
//! synchronization.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Settings;
use crate::effect::{EffectPlayer, EffectSession};
use crate::error::{CheatcodeError, SequenceError};
use crate::matcher::{MatchOutcome, SequenceMatcher};
use crate::observability::events::{Event, EventEmitter, RunSummary, StopReason};
use crate::observability::metrics;
use crate::surface::Surface;
use crate::token::{self, KeyToken};

/// Sequence detector wired to an effect player.
pub struct Detector<S> {
    matcher: SequenceMatcher,
    player: EffectPlayer<S>,
    events: Arc<EventEmitter>,
    summary: RunSummary,
}

impl<S> std::fmt::Debug for Detector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("matcher", &self.matcher)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<S: Surface + 'static> Detector<S> {
    /// Wires an existing matcher and player together.
    #[must_use]
    pub fn new(matcher: SequenceMatcher, player: EffectPlayer<S>, events: Arc<EventEmitter>) -> Self {
        Self {
            matcher,
            player,
            events,
            summary: RunSummary::default(),
        }
    }

    /// Builds the matcher and player described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::EmptyTarget`] if the configured sequence is
    /// empty.
    pub fn from_settings(
        settings: &Settings,
        surface: Arc<Mutex<S>>,
        events: Arc<EventEmitter>,
    ) -> Result<Self, SequenceError> {
        let matcher = SequenceMatcher::new(settings.sequence.clone(), settings.restart)?;
        let player =
            EffectPlayer::with_events(surface, settings.effect.clone(), Arc::clone(&events));
        Ok(Self::new(matcher, player, events))
    }

    /// Handles one key-press token.
    ///
    /// Returns the new effect session when this token completed the target.
    pub fn on_input_token(&mut self, token: &KeyToken) -> Option<EffectSession> {
        self.summary.tokens_seen += 1;
        metrics::record_token();

        match self.matcher.feed(token) {
            MatchOutcome::Completed => {
                self.summary.matches += 1;
                metrics::record_match();
                info!(
                    tokens_seen = self.summary.tokens_seen,
                    matches = self.summary.matches,
                    "target sequence matched"
                );
                self.events.emit(Event::SequenceMatched {
                    timestamp: Utc::now(),
                    tokens_seen: self.summary.tokens_seen,
                    match_count: self.summary.matches,
                });
                Some(self.player.play())
            }
            MatchOutcome::Advanced { cursor } => {
                debug!(%token, cursor, "sequence advanced");
                None
            }
            MatchOutcome::Reset { cursor } => {
                debug!(%token, cursor, "sequence reset");
                None
            }
        }
    }

    /// Consumes newline-separated input until EOF or cancellation.
    ///
    /// Each line may carry several whitespace-separated tokens; `#` lines
    /// are comments. At EOF the detector waits for live effect sessions to
    /// finish (cancellation during that wait ends them immediately). On
    /// cancellation live sessions are ended at once.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading the input fails.
    pub async fn run<R>(
        &mut self,
        input: R,
        cancel: CancellationToken,
    ) -> Result<StopReason, CheatcodeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let effect = self.player.config();
        self.events.emit(Event::DetectorStarted {
            timestamp: Utc::now(),
            target_len: self.matcher.len(),
            restart: self.matcher.policy().to_string(),
            session_policy: effect.session_policy.to_string(),
            lifetime_ms: u64::try_from(effect.lifetime.as_millis()).unwrap_or(u64::MAX),
        });
        info!(
            target_len = self.matcher.len(),
            restart = %self.matcher.policy(),
            "detector started"
        );

        let mut lines = input.lines();
        let reason = loop {
            tokio::select! {
                () = cancel.cancelled() => break StopReason::Cancelled,
                line = lines.next_line() => match line? {
                    Some(line) => {
                        self.summary.lines_read += 1;
                        for token in token::parse_line(&line) {
                            self.on_input_token(&token);
                        }
                    }
                    None => break StopReason::EndOfInput,
                },
            }
        };

        match reason {
            StopReason::EndOfInput => {
                tokio::select! {
                    () = self.player.wait_idle() => {}
                    () = cancel.cancelled() => self.player.shutdown(),
                }
            }
            StopReason::Cancelled => self.player.shutdown(),
        }

        info!(
            tokens_seen = self.summary.tokens_seen,
            matches = self.summary.matches,
            ?reason,
            "detector stopped"
        );
        self.events.emit(Event::DetectorStopped {
            timestamp: Utc::now(),
            reason,
            summary: self.summary,
        });
        Ok(reason)
    }

    /// The matcher, for inspecting the cursor.
    #[must_use]
    pub const fn matcher(&self) -> &SequenceMatcher {
        &self.matcher
    }

    /// The effect player.
    #[must_use]
    pub const fn player(&self) -> &EffectPlayer<S> {
        &self.player
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn summary(&self) -> RunSummary {
        self.summary
    }
}
