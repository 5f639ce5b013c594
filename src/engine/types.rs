//! Engine types
//!
//! The per-run sync context and run statistics.

use crate::config::TapConfig;
use crate::error::Result;
use crate::output::RecordSink;
use crate::report::ReportSource;
use crate::state::StateManager;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Everything a stream needs during one sync
///
/// Owns the report source, the state and the sink for the lifetime of the
/// run. `now` is fixed when the context is built and is the clock every
/// stream uses for "today" and `time_extracted`.
pub struct SyncContext {
    /// Tap configuration
    pub config: TapConfig,
    /// Where reports come from
    pub source: Box<dyn ReportSource>,
    /// Bookmarks
    pub state: StateManager,
    /// Where messages go
    pub sink: Box<dyn RecordSink>,
    /// Clock for this run
    pub now: DateTime<Utc>,
}

impl SyncContext {
    /// Create a context using the current time
    pub fn new(
        config: TapConfig,
        source: Box<dyn ReportSource>,
        state: StateManager,
        sink: Box<dyn RecordSink>,
    ) -> Self {
        Self {
            config,
            source,
            state,
            sink,
            now: Utc::now(),
        }
    }

    /// Pin the run clock
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Checkpoint: emit the full state and persist it when file-backed
    pub async fn write_state(&mut self) -> Result<()> {
        let value = self.state.to_value().await?;
        self.sink.write_state(value)?;
        self.state.save().await?;
        debug!("state checkpoint written");
        Ok(())
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("state", &self.state)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Total records emitted
    pub records_synced: usize,
    /// Total streams synced
    pub streams_synced: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
