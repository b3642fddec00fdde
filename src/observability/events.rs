//! Structured event stream for `cheatcode`.
//!
//! Discrete, typed events emitted while the detector runs. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during `cheatcode` operation.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The detector is ready to consume tokens.
    DetectorStarted {
        /// When the detector started.
        timestamp: DateTime<Utc>,
        /// Number of tokens in the target sequence.
        target_len: usize,
        /// Restart policy name.
        restart: String,
        /// Session policy name.
        session_policy: String,
        /// Effect lifetime in milliseconds.
        lifetime_ms: u64,
    },

    /// The target sequence was completed.
    SequenceMatched {
        /// When the final token arrived.
        timestamp: DateTime<Utc>,
        /// Tokens consumed so far, including the completing one.
        tokens_seen: u64,
        /// One-based count of completions so far.
        match_count: u64,
    },

    /// An effect session started.
    EffectStarted {
        /// When the overlay was inserted.
        timestamp: DateTime<Utc>,
        /// Session id.
        session_id: u64,
        /// Scheduled lifetime in milliseconds.
        lifetime_ms: u64,
    },

    /// An effect session ended and its cleanup ran.
    EffectEnded {
        /// When the cleanup ran.
        timestamp: DateTime<Utc>,
        /// Session id.
        session_id: u64,
        /// Why the session ended.
        reason: EndReason,
        /// Time the session was live, in milliseconds.
        elapsed_ms: u64,
    },

    /// The detector stopped consuming tokens.
    DetectorStopped {
        /// When the detector stopped.
        timestamp: DateTime<Utc>,
        /// Why it stopped.
        reason: StopReason,
        /// Counters for the run.
        summary: RunSummary,
    },
}

/// Why an effect session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Its lifetime elapsed.
    Expired,
    /// A newer session replaced it.
    Replaced,
    /// It was cancelled through its handle.
    Cancelled,
    /// The player shut down.
    Shutdown,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Expired => "expired",
            Self::Replaced => "replaced",
            Self::Cancelled => "cancelled",
            Self::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// Why the detector stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The input stream ended.
    EndOfInput,
    /// Cancelled (Ctrl+C or shutdown request).
    Cancelled,
}

/// Counters describing one detector run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Tokens consumed.
    pub tokens_seen: u64,
    /// Times the target sequence completed.
    pub matches: u64,
    /// Input lines read (comments and blanks included).
    pub lines_read: u64,
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are silently dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    ///
    /// stdout belongs to the console surface, so events default here.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::SequenceMatched {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            tokens_seen: 10,
            match_count: 1,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "SequenceMatched");
        assert_eq!(parsed["tokens_seen"], 10);
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::EffectEnded {
            timestamp: Utc::now(),
            session_id: 1,
            reason: EndReason::Expired,
            elapsed_ms: 2000,
        });

        assert_eq!(emitter.event_count(), 2);

        let lines: Vec<serde_json::Value> = tw
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["reason"], "expired");
    }

    #[test]
    fn stopped_event_nests_summary() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(Event::DetectorStopped {
            timestamp: Utc::now(),
            reason: StopReason::EndOfInput,
            summary: RunSummary {
                tokens_seen: 22,
                matches: 2,
                lines_read: 3,
            },
        });

        let parsed: serde_json::Value = serde_json::from_str(tw.contents().trim()).unwrap();
        assert_eq!(parsed["type"], "DetectorStopped");
        assert_eq!(parsed["reason"], "end_of_input");
        assert_eq!(parsed["summary"]["matches"], 2);
    }

    #[test]
    fn envelope_flattens_event_fields() {
        let envelope = EventEnvelope {
            sequence: 7,
            event: sample_event(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["sequence"], 7);
        assert_eq!(parsed["type"], "SequenceMatched");
        assert!(
            parsed.get("event").is_none(),
            "event field should be flattened"
        );
    }

    #[test]
    fn noop_emitter_still_counts() {
        let emitter = EventEmitter::noop();
        emitter.emit(sample_event());
        assert_eq!(emitter.event_count(), 1);
    }

    #[test]
    fn end_reason_display() {
        assert_eq!(EndReason::Replaced.to_string(), "replaced");
        assert_eq!(EndReason::Shutdown.to_string(), "shutdown");
    }
}
