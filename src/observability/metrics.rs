//! Metrics for `cheatcode`.
//!
//! Recorded through the `metrics` facade. No exporter is installed here;
//! without a recorder every call is a no-op, and an embedding application
//! can install whichever recorder it uses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Guard so descriptions are registered once per process.
static DESCRIBED: AtomicBool = AtomicBool::new(false);

/// Registers metric descriptions with the installed recorder.
///
/// Call after installing a recorder; repeated calls are ignored.
pub fn describe_metrics() {
    if DESCRIBED.swap(true, Ordering::SeqCst) {
        return;
    }
    describe_counter!("cheatcode_tokens_total", "Key tokens consumed");
    describe_counter!(
        "cheatcode_matches_total",
        "Times the target sequence completed"
    );
    describe_gauge!("cheatcode_effects_active", "Effect sessions currently live");
    describe_histogram!(
        "cheatcode_effect_duration_ms",
        "How long effect sessions stayed live, in milliseconds"
    );
}

/// Records one consumed token.
pub fn record_token() {
    counter!("cheatcode_tokens_total").increment(1);
}

/// Records one completed target sequence.
pub fn record_match() {
    counter!("cheatcode_matches_total").increment(1);
}

/// Sets the number of live effect sessions.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_effects(count: usize) {
    gauge!("cheatcode_effects_active").set(count as f64);
}

/// Records how long an effect session stayed live.
pub fn record_effect_duration(duration: Duration) {
    histogram!("cheatcode_effect_duration_ms").record(duration.as_secs_f64() * 1000.0);
}
