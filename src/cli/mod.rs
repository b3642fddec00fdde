//! Command-line interface
//!
//! Argument parsing and command handlers for the `cheatcode` binary.

pub mod args;
pub mod commands;
