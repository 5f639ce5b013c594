//! Date range partitioning
//!
//! Splits a long backfill range into bounded windows so no single report
//! request has to cover more than a fixed number of days.

mod intervals;

pub use intervals::{break_into_intervals, Intervals};
