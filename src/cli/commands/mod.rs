//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod run;
pub mod sequence;
pub mod validate;
pub mod version;

use crate::cli::args::{Cli, Commands};
use crate::error::CheatcodeError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), CheatcodeError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cli.quiet).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Sequence(args) => sequence::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
