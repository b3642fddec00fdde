//! Diagnostic logging.
//!
//! Everything goes to stderr through `tracing`; stdout is left to the console
//! surface. `-v` raises the level of this crate only, dependencies stay at
//! `warn`. `CHEATCODE_LOG_LEVEL` replaces the whole filter.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;
use crate::config::loader::EnvLookup;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "CHEATCODE_LOG_LEVEL";

/// Baseline for every crate other than this one.
const BASE_DIRECTIVE: &str = "warn";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines, colored on a terminal.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Filter directives for a `-v` count.
///
/// 0 keeps everything at `warn`; each extra `-v` raises `cheatcode` one
/// level (`info`, `debug`, `trace`), saturating at `trace`.
#[must_use]
pub fn verbosity_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return BASE_DIRECTIVE.to_string(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{BASE_DIRECTIVE},{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Subscriber settings resolved from the flags and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Output format.
    pub format: LogFormat,
    /// Directives derived from `-v`.
    pub directives: String,
    /// Value of `CHEATCODE_LOG_LEVEL`, tried before `directives`.
    pub env_directives: Option<String>,
    /// Whether human output carries ANSI colors.
    pub ansi: bool,
    /// Whether each line names its module.
    pub show_target: bool,
}

impl LogSettings {
    /// Resolves settings against the given environment.
    ///
    /// `auto` colors only when stderr is a terminal and `NO_COLOR` is unset
    /// or empty.
    #[must_use]
    pub fn resolve(
        format: LogFormat,
        verbosity: u8,
        color: ColorChoice,
        stderr_is_terminal: bool,
        env: EnvLookup,
    ) -> Self {
        let ansi = match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                stderr_is_terminal && env("NO_COLOR").is_none_or(|v| v.is_empty())
            }
        };

        Self {
            format,
            directives: verbosity_directives(verbosity),
            env_directives: env(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()),
            ansi: ansi && format == LogFormat::Human,
            show_target: verbosity >= 2,
        }
    }

    /// Builds the filter, falling back to the `-v` directives when the
    /// environment override does not parse.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        self.env_directives
            .as_deref()
            .and_then(|d| EnvFilter::try_new(d).ok())
            .unwrap_or_else(|| EnvFilter::new(&self.directives))
    }

    /// Installs the global subscriber on stderr.
    ///
    /// A subscriber that is already installed is left in place.
    pub fn install(&self) {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_target(self.show_target)
            .with_writer(std::io::stderr);

        let _ = match self.format {
            LogFormat::Human => builder.with_ansi(self.ansi).try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
    }
}

/// Resolves logging against the process environment and installs it.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    LogSettings::resolve(
        format,
        verbosity,
        color,
        std::io::stderr().is_terminal(),
        |name| std::env::var(name).ok(),
    )
    .install();
}
