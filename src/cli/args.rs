//! CLI argument definitions
//!
//! All Clap derive structs for `cheatcode` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::Overrides;
use crate::effect::SessionPolicy;
use crate::matcher::RestartPolicy;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Watches key presses for a cheat code and plays a timed effect.
#[derive(Parser, Debug)]
#[command(name = "cheatcode", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CHEATCODE_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true, env = "CHEATCODE_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read key tokens from stdin and play the effect on every match.
    Run(RunArgs),

    /// Validate a configuration file.
    Validate(ValidateArgs),

    /// Print the effective target sequence.
    Sequence(SequenceArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "CHEATCODE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Write JSONL events to this file ("-" for stderr).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Skip the greeting banner.
    #[arg(long)]
    pub no_greeting: bool,
}

/// Flags that replace configuration file values.
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Target sequence, comma separated (e.g. "up,up,down,down,b,a").
    #[arg(long, value_delimiter = ',')]
    pub sequence: Option<Vec<String>>,

    /// Cursor fallback on mismatch.
    #[arg(long)]
    pub restart: Option<RestartPolicy>,

    /// Effect lifetime (e.g. "2s", "500ms").
    #[arg(long, value_parser = humantime::parse_duration)]
    pub lifetime: Option<Duration>,

    /// What a new effect does to live ones.
    #[arg(long)]
    pub session_policy: Option<SessionPolicy>,
}

impl From<&OverrideArgs> for Overrides {
    fn from(args: &OverrideArgs) -> Self {
        Self {
            sequence: args.sequence.clone(),
            restart: args.restart,
            lifetime: args.lifetime,
            session_policy: args.session_policy,
        }
    }
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file to check.
    pub path: PathBuf,

    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `sequence`.
#[derive(Args, Debug)]
pub struct SequenceArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "CHEATCODE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell.
    pub shell: Shell,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Value Enums
// ============================================================================

/// Color output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
