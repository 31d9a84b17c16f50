//! Command-line interface for corpus-forge.
//!
//! Provides the two validation commands, one per corpus variant.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
