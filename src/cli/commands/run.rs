//! `run` command
//!
//! Reads key tokens from stdin, renders effects to stdout, and stops at EOF
//! or on Ctrl+C.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::config::{self, Overrides};
use crate::detector::Detector;
use crate::error::CheatcodeError;
use crate::observability::{EventEmitter, StopReason, describe_metrics};
use crate::surface::ConsoleSurface;
use crate::token::KeyToken;

const GREETING: &str = "\
👋 Hello, Developer!

Type key names on stdin, one or more per line (up, down, left, right, b, a).
Enter the right sequence and see what happens.

✨ Happy coding! ✨
";

/// Run the detector on stdin until EOF or interruption.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the events file
/// cannot be created, or stdin fails.
pub async fn run(args: &RunArgs, quiet: bool) -> Result<(), CheatcodeError> {
    let (settings, warnings) =
        config::resolve(args.config.as_deref(), &Overrides::from(&args.overrides))?;
    for warning in &warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    let events = Arc::new(open_events(args.events.as_deref())?);
    describe_metrics();

    if !quiet && !args.no_greeting {
        eprintln!("{GREETING}");
        let keys: Vec<&str> = settings.sequence.iter().map(KeyToken::as_str).collect();
        tracing::debug!(sequence = %keys.join(" "), "watching for sequence");
    }

    let surface = Arc::new(Mutex::new(ConsoleSurface::stdout()));
    let mut detector = Detector::from_settings(&settings, surface, events)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let reason = detector
        .run(BufReader::new(tokio::io::stdin()), cancel)
        .await?;

    let summary = detector.summary();
    tracing::info!(
        lines = summary.lines_read,
        tokens = summary.tokens_seen,
        matches = summary.matches,
        interrupted = reason == StopReason::Cancelled,
        "run finished"
    );

    Ok(())
}

/// `-` selects stderr; stdout carries the console surface.
fn open_events(path: Option<&Path>) -> Result<EventEmitter, CheatcodeError> {
    match path {
        None => Ok(EventEmitter::noop()),
        Some(p) if p == Path::new("-") => Ok(EventEmitter::stderr()),
        Some(p) => Ok(EventEmitter::from_file(p)?),
    }
}
