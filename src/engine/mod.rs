//! Execution engine module
//!
//! Runs the registered streams against one sync context.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncContext` - Config, report source, state, sink and clock for a run
//! - `SyncEngine` - Writes each stream's schema, then syncs it
//! - `SyncStats` - Totals for the run

mod types;

pub use types::{SyncContext, SyncStats};

use crate::error::Result;
use crate::streams::{self, Stream};
use std::time::Instant;
use tracing::info;

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// Streams to run, in order
    streams: Vec<Box<dyn Stream>>,
}

impl SyncEngine {
    /// Create an engine over the given streams
    pub fn new(streams: Vec<Box<dyn Stream>>) -> Self {
        Self { streams }
    }

    /// Create an engine over every registered stream
    pub fn with_registry() -> Self {
        Self::new(streams::all_streams())
    }

    /// Ids of the streams this engine runs
    pub fn stream_ids(&self) -> Vec<&'static str> {
        self.streams.iter().map(|s| s.tap_stream_id()).collect()
    }

    /// Sync every stream in order, stopping at the first error
    pub async fn run(&self, ctx: &mut SyncContext) -> Result<SyncStats> {
        let start = Instant::now();
        let mut stats = SyncStats::new();

        for stream in &self.streams {
            let stream_id = stream.tap_stream_id();
            info!("Starting sync for stream: {stream_id}");

            ctx.sink.write_schema(
                stream_id,
                stream.schema(),
                stream.key_properties(),
                &[stream.replication_key()],
            )?;

            let count = stream.sync(ctx).await?;
            stats.add_records(count);
            stats.add_stream();

            info!("Completed sync for {stream_id}: {count} records");
        }

        stats.set_duration(start.elapsed().as_millis() as u64);
        Ok(stats)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("streams", &self.stream_ids())
            .finish()
    }
}
