//! Response classification
//!
//! The report API signals throttling with 429 and, under load, with 502
//! from its gateway. Both are worth waiting out; every other non-2xx
//! status ends the run.

use reqwest::StatusCode;

/// Status codes treated as a request to back off and retry
pub const RATE_LIMIT_STATUSES: [u16; 2] = [429, 502];

/// How a response status is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx, proceed
    Success,
    /// Back off and retry the whole operation
    RateLimited,
    /// Any other status, fatal
    Failure,
}

impl ResponseClass {
    /// Classify a response status
    pub fn of(status: StatusCode) -> Self {
        Self::from_code(status.as_u16())
    }

    /// Classify a raw status code
    pub fn from_code(code: u16) -> Self {
        if RATE_LIMIT_STATUSES.contains(&code) {
            Self::RateLimited
        } else if (200..300).contains(&code) {
            Self::Success
        } else {
            Self::Failure
        }
    }

    /// Check if the response should be retried
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
