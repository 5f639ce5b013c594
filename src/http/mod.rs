//! HTTP client module
//!
//! Provides the HTTP client shared by every API call of the tap.
//!
//! # Features
//!
//! - **Response Classification**: 429/502 mean "retry later", other non-2xx are fatal
//! - **Automatic Retries**: rate limited operations are retried with exponential backoff
//! - **Request Timing**: every call is logged with its endpoint, status and duration

mod client;
mod rate_limit;

pub use client::{
    ensure_success, error_for_status, HttpClient, HttpClientConfig, HttpClientConfigBuilder,
};
pub use rate_limit::{ResponseClass, RATE_LIMIT_STATUSES};
