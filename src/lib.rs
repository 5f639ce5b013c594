// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-idealo-click-report
//!
//! Incremental extraction of idealo click reports as a Singer tap.
//!
//! ## Features
//!
//! - **Async report jobs**: submit, poll and download zipped CSV reports
//! - **Rate limit handling**: 429/502 responses back off exponentially and retry
//! - **Incremental sync**: a per-shop watermark so every run only emits new rows
//! - **Stable keys**: each row gets a SHA-1 surrogate key from `Date` and `Customer-IP`
//! - **Singer output**: `SCHEMA`, `RECORD` and `STATE` messages on stdout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_idealo_click_report::config::TapConfig;
//! use tap_idealo_click_report::engine::{SyncContext, SyncEngine};
//! use tap_idealo_click_report::output::JsonLinesSink;
//! use tap_idealo_click_report::report::ReportClient;
//! use tap_idealo_click_report::state::StateManager;
//!
//! #[tokio::main]
//! async fn main() -> tap_idealo_click_report::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let client = ReportClient::connect(
//!         config.credentials(),
//!         config.http_config(),
//!         config.poll_config(),
//!     )
//!     .await?;
//!
//!     let state = StateManager::from_file("state.json")?;
//!     let sink = Box::new(JsonLinesSink::stdout());
//!     let mut ctx = SyncContext::new(config, Box::new(client), state, sink);
//!
//!     let stats = SyncEngine::with_registry().run(&mut ctx).await?;
//!     eprintln!("{} records", stats.records_synced);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         SyncEngine                              │
//! │  for each stream: SCHEMA → sync(ctx) → RECORDs → STATE          │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │    Report     │  Decode   │ State/Output│
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OAuth    │ Timing    │ Submit        │ CSV       │ Bookmarks   │
//! │ Basic    │ 429 / 502 │ Poll          │ Watermark │ JSON lines  │
//! │ Bearer   │ Backoff   │ Download ZIP  │ SHA-1 key │ Metrics     │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// OAuth client credentials flow
pub mod auth;

/// HTTP client with rate limit retry
pub mod http;

/// Report job lifecycle and archive extraction
pub mod report;

/// Report body decoders
pub mod decode;

/// Date range partitioning
pub mod partition;

/// State management and checkpointing
pub mod state;

/// Singer messages and sinks
pub mod output;

/// Stream definitions
pub mod streams;

/// Sync orchestration
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
