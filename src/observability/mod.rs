//! Observability module
//!
//! Logging, metrics, and the structured event stream emitted while the
//! detector runs.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EndReason, Event, EventEmitter, RunSummary, StopReason};
pub use logging::{LogFormat, LogSettings, init_logging};
pub use metrics::describe_metrics;
