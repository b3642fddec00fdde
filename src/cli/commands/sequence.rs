//! `sequence` command
//!
//! Prints the target sequence that `run` would watch for, after the config
//! file and overrides are applied.

use crate::cli::args::{OutputFormat, SequenceArgs};
use crate::config::{self, Overrides};
use crate::error::CheatcodeError;
use crate::token::KeyToken;

/// Print the effective target sequence.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(args: &SequenceArgs) -> Result<(), CheatcodeError> {
    let (settings, warnings) =
        config::resolve(args.config.as_deref(), &Overrides::from(&args.overrides))?;
    for warning in &warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    match args.format {
        OutputFormat::Human => {
            let keys: Vec<&str> = settings.sequence.iter().map(KeyToken::as_str).collect();
            println!("{}", keys.join(" "));
            println!(
                "restart: {}, lifetime: {}, session policy: {}",
                settings.restart,
                humantime::format_duration(settings.effect.lifetime),
                settings.effect.session_policy
            );
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "sequence": settings.sequence,
                "restart": settings.restart,
                "lifetime_ms": u64::try_from(settings.effect.lifetime.as_millis()).unwrap_or(u64::MAX),
                "session_policy": settings.effect.session_policy,
            });
            println!("{report}");
        }
    }

    Ok(())
}
