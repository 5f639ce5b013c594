//! Output module
//!
//! Singer message types and the sinks that write them.
//!
//! # Overview
//!
//! This module provides:
//! - `Message` - `SCHEMA`, `RECORD` and `STATE` messages
//! - `Metric` - counters reported alongside the stream
//! - `RecordSink` - where a sync writes its messages
//! - `JsonLinesSink` - one JSON message per line on any writer (stdout in the CLI)
//! - `MemorySink` - collects messages for inspection

mod sink;
mod types;

pub use sink::{JsonLinesSink, MemorySink, RecordSink};
pub use types::{Message, Metric, MetricType};
