//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Extract idealo click reports as a Singer tap
#[derive(Parser, Debug)]
#[command(name = "tap-idealo-click-report")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON, or YAML by extension)
    #[arg(short, long, required_unless_present = "config_json")]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, conflicts_with = "config")]
    pub config_json: Option<String>,

    /// State file (JSON); rewritten on every checkpoint
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, conflicts_with = "state")]
    pub state_json: Option<String>,

    /// Print the catalog instead of syncing
    #[arg(short, long)]
    pub discover: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
