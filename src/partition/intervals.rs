//! Interval iterator

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};

/// Lazy sequence of `(start, end)` windows covering a range
///
/// Each window is at most `step` long, windows are contiguous, and the last
/// one ends exactly at the range end. Cloning yields an independent
/// iterator from the same position.
#[derive(Debug, Clone)]
pub struct Intervals {
    next_start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
}

impl Intervals {
    /// Windows over `[start, end)` of at most `step`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(Error::invalid_value(
                "interval",
                format!("window length must be positive, got {step}"),
            ));
        }

        Ok(Self {
            next_start: start,
            end,
            step,
        })
    }
}

impl Iterator for Intervals {
    type Item = (DateTime<Utc>, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.end {
            return None;
        }

        let start = self.next_start;
        let end = start
            .checked_add_signed(self.step)
            .map_or(self.end, |next| next.min(self.end));
        self.next_start = end;
        Some((start, end))
    }
}

/// Break `(last_bookmark, now]` into windows of at most `days` days
///
/// The first window starts one millisecond after `start`, so a row stamped
/// exactly at the previous watermark is not requested again.
pub fn break_into_intervals(days: i64, start: DateTime<Utc>, now: DateTime<Utc>) -> Result<Intervals> {
    if days <= 0 {
        return Err(Error::invalid_value(
            "days",
            format!("window length must be positive, got {days}"),
        ));
    }

    let step = Duration::try_days(days).ok_or_else(|| {
        Error::invalid_value("days", format!("window length of {days} days is out of range"))
    })?;
    let first = start
        .checked_add_signed(Duration::milliseconds(1))
        .ok_or_else(|| Error::invalid_value("start", format!("{start} is out of range")))?;

    Intervals::new(first, now, step)
}
