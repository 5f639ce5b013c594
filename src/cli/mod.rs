//! CLI module
//!
//! Command-line interface following the Singer tap conventions.
//!
//! # Modes
//!
//! - `--discover` - Print the catalog and exit
//! - default - Sync every stream, writing Singer messages to stdout

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
