//! Stream definitions
//!
//! Each stream is a value implementing [`Stream`], registered by its tap
//! stream id. Only `click_report` exists today.

mod click_reports;
mod types;

pub use click_reports::{process_rows, surrogate_key, ClickReports, ProcessedRows};
pub use types::{ReplicationMethod, Stream};

use crate::error::{Error, Result};

/// Every registered stream, in sync order
pub fn all_streams() -> Vec<Box<dyn Stream>> {
    vec![Box::new(ClickReports)]
}

/// Look up a stream by its tap stream id
pub fn get_stream(stream_id: &str) -> Result<Box<dyn Stream>> {
    all_streams()
        .into_iter()
        .find(|s| s.tap_stream_id() == stream_id)
        .ok_or_else(|| Error::StreamNotFound {
            stream: stream_id.to_string(),
        })
}

#[cfg(test)]
mod tests;
