//! Timed effect player.
//!
//! [`EffectPlayer::play`] inserts an overlay node and a keyframe style into
//! the surface, starts the root container's shake animation, and spawns a
//! task that undoes all three once the session lifetime elapses.
//!
//! Each session's cleanup runs exactly once. It normally runs when the
//! lifetime timer fires. It runs earlier when the session is cancelled
//! through its handle, replaced under [`SessionPolicy::Replace`], or ended
//! by [`EffectPlayer::shutdown`]. An atomic flag on the session decides
//! which path gets to run it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::observability::events::{EndReason, Event, EventEmitter};
use crate::observability::metrics;
use crate::surface::{NodeId, OverlayNode, StyleSheet, Surface};

/// Default session lifetime.
pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(2000);

const DEFAULT_CONTENT: &str = "🎮 Cheat code activated!";

const DEFAULT_OVERLAY_STYLE: &str = "position: fixed; top: 50%; left: 50%; \
transform: translate(-50%, -50%); font-size: 3rem; z-index: 10000; \
pointer-events: none; animation: cheat-pop 2s ease-out forwards;";

const DEFAULT_KEYFRAMES: &str = "@keyframes cheat-shake { \
0%, 100% { transform: translateX(0); } \
25% { transform: translateX(-10px); } \
75% { transform: translateX(10px); } } \
@keyframes cheat-pop { \
0% { opacity: 0; transform: translate(-50%, -50%) scale(0.5); } \
20% { opacity: 1; transform: translate(-50%, -50%) scale(1.1); } \
100% { opacity: 0; transform: translate(-50%, -50%) scale(1); } }";

const DEFAULT_ROOT_ANIMATION: &str = "cheat-shake 0.5s ease-in-out 4";

/// What a new session does to sessions that are still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPolicy {
    /// Leave them alone; every session ends on its own timer.
    #[default]
    Overlap,
    /// End them (cleanup included) before the new session starts.
    Replace,
}

impl std::fmt::Display for SessionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Overlap => "overlap",
            Self::Replace => "replace",
        })
    }
}

/// What one session draws and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectConfig {
    /// How long a session stays live.
    pub lifetime: Duration,
    /// Handling of sessions still live when a new one starts.
    pub session_policy: SessionPolicy,
    /// Overlay node inserted for each session.
    pub overlay: OverlayNode,
    /// Style sheet inserted for each session.
    pub keyframes: String,
    /// Animation applied to the root container while a session is live.
    pub root_animation: String,
    /// Console line written when a session starts.
    pub announcement: Option<String>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_LIFETIME,
            session_policy: SessionPolicy::default(),
            overlay: OverlayNode {
                content: DEFAULT_CONTENT.to_string(),
                style: DEFAULT_OVERLAY_STYLE.to_string(),
            },
            keyframes: DEFAULT_KEYFRAMES.to_string(),
            root_animation: DEFAULT_ROOT_ANIMATION.to_string(),
            announcement: Some(DEFAULT_CONTENT.to_string()),
        }
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-session bookkeeping shared by the player, the timer task, and the
/// caller's handle.
#[derive(Debug)]
struct SessionState {
    id: u64,
    started_at: Instant,
    lifetime: Duration,
    overlay: NodeId,
    style: NodeId,
    finished: AtomicBool,
}

/// A session as tracked by the player.
struct LiveSession {
    state: Arc<SessionState>,
    cancel: CancellationToken,
}

/// Runs a session's cleanup. Object-safe so handles need not carry `S`.
trait Finish: Send + Sync {
    fn finish(&self, state: &SessionState, reason: EndReason) -> bool;
}

struct Inner<S> {
    surface: Arc<Mutex<S>>,
    events: Arc<EventEmitter>,
    live: Mutex<Vec<LiveSession>>,
    active: watch::Sender<usize>,
}

impl<S: Surface> Finish for Inner<S> {
    fn finish(&self, state: &SessionState, reason: EndReason) -> bool {
        if state.finished.swap(true, Ordering::SeqCst) {
            return false;
        }

        {
            let mut surface = lock(&self.surface);
            surface.remove(state.overlay);
            surface.remove(state.style);
            surface.set_root_animation(None);
        }

        let remaining = {
            let mut live = lock(&self.live);
            live.retain(|s| s.state.id != state.id);
            live.len()
        };

        let elapsed = state.started_at.elapsed();
        metrics::set_active_effects(remaining);
        metrics::record_effect_duration(elapsed);
        debug!(session_id = state.id, %reason, remaining, "effect session ended");

        self.events.emit(Event::EffectEnded {
            timestamp: Utc::now(),
            session_id: state.id,
            reason,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });

        // Wakes wait_idle(); everything about this session must be out first
        self.active.send_replace(remaining);
        true
    }
}

/// Plays self-cleaning effect sessions on a shared surface.
pub struct EffectPlayer<S> {
    inner: Arc<Inner<S>>,
    config: EffectConfig,
    next_id: AtomicU64,
}

impl<S> std::fmt::Debug for EffectPlayer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectPlayer")
            .field("config", &self.config)
            .field("active", &*self.inner.active.borrow())
            .finish_non_exhaustive()
    }
}

impl<S: Surface + 'static> EffectPlayer<S> {
    /// Creates a player drawing on `surface`. Events are discarded.
    #[must_use]
    pub fn new(surface: Arc<Mutex<S>>, config: EffectConfig) -> Self {
        Self::with_events(surface, config, Arc::new(EventEmitter::noop()))
    }

    /// Creates a player that reports session start/end on `events`.
    #[must_use]
    pub fn with_events(
        surface: Arc<Mutex<S>>,
        config: EffectConfig,
        events: Arc<EventEmitter>,
    ) -> Self {
        let (active, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                surface,
                events,
                live: Mutex::new(Vec::new()),
                active,
            }),
            config,
            next_id: AtomicU64::new(0),
        }
    }

    /// Starts a new effect session.
    ///
    /// Surface mutations happen before this returns; the removal is
    /// scheduled on the tokio runtime, so this must be called from within
    /// one.
    pub fn play(&self) -> EffectSession {
        if self.config.session_policy == SessionPolicy::Replace {
            let previous = std::mem::take(&mut *lock(&self.inner.live));
            for session in previous {
                session.cancel.cancel();
                self.inner.finish(&session.state, EndReason::Replaced);
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let (overlay, style) = {
            let mut surface = lock(&self.inner.surface);
            let overlay = surface.append_overlay(self.config.overlay.clone());
            let style = surface.append_style(StyleSheet {
                css: self.config.keyframes.clone(),
            });
            surface.set_root_animation(Some(&self.config.root_animation));
            if let Some(line) = &self.config.announcement {
                surface.console(line);
            }
            (overlay, style)
        };

        let state = Arc::new(SessionState {
            id,
            started_at: Instant::now(),
            lifetime: self.config.lifetime,
            overlay,
            style,
            finished: AtomicBool::new(false),
        });
        let cancel = CancellationToken::new();

        let active = {
            let mut live = lock(&self.inner.live);
            live.push(LiveSession {
                state: Arc::clone(&state),
                cancel: cancel.clone(),
            });
            live.len()
        };
        self.inner.active.send_replace(active);
        metrics::set_active_effects(active);

        let lifetime_ms = u64::try_from(self.config.lifetime.as_millis()).unwrap_or(u64::MAX);
        info!(session_id = id, lifetime_ms, active, "effect session started");
        self.inner.events.emit(Event::EffectStarted {
            timestamp: Utc::now(),
            session_id: id,
            lifetime_ms,
        });

        let inner = Arc::clone(&self.inner);
        let task_state = Arc::clone(&state);
        let task_cancel = cancel.clone();
        let lifetime = self.config.lifetime;
        let join = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(lifetime) => {
                    inner.finish(&task_state, EndReason::Expired);
                }
                () = task_cancel.cancelled() => {}
            }
        });

        let finisher: Arc<dyn Finish> = self.inner.clone();
        EffectSession {
            state,
            cancel,
            finisher,
            join,
        }
    }

    /// Number of sessions whose cleanup has not run yet.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        lock(&self.inner.live).len()
    }

    /// Waits until no session is live.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.active.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Ends every live session now, running each cleanup.
    pub fn shutdown(&self) {
        let sessions = std::mem::take(&mut *lock(&self.inner.live));
        for session in sessions {
            session.cancel.cancel();
            self.inner.finish(&session.state, EndReason::Shutdown);
        }
    }

    /// The configuration sessions are played with.
    #[must_use]
    pub const fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// The surface sessions draw on.
    #[must_use]
    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.inner.surface
    }
}

/// Handle to one effect session.
///
/// Dropping the handle does not end the session.
pub struct EffectSession {
    state: Arc<SessionState>,
    cancel: CancellationToken,
    finisher: Arc<dyn Finish>,
    join: JoinHandle<()>,
}

impl std::fmt::Debug for EffectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectSession")
            .field("id", &self.state.id)
            .field("lifetime", &self.state.lifetime)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl EffectSession {
    /// Session id, unique per player and increasing from 1.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// When the session's nodes were inserted.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.state.started_at
    }

    /// Scheduled lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.state.lifetime
    }

    /// Id of the overlay node this session inserted.
    #[must_use]
    pub fn overlay_node(&self) -> NodeId {
        self.state.overlay
    }

    /// Id of the style node this session inserted.
    #[must_use]
    pub fn style_node(&self) -> NodeId {
        self.state.style
    }

    /// Whether the cleanup has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst)
    }

    /// Ends the session now. Returns `false` if its cleanup already ran.
    pub fn cancel(&self) -> bool {
        self.cancel.cancel();
        self.finisher.finish(&self.state, EndReason::Cancelled)
    }

    /// Waits for the session's timer task to exit.
    pub async fn finished(self) {
        let _ = self.join.await;
    }
}
