// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]

//! tap-idealo-click-report CLI
//!
//! Singer tap entry point. Messages go to stdout, logs to stderr.

use clap::Parser;
use tap_idealo_click_report::cli::{Cli, Runner};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
