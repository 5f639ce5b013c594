//! Click report acquisition
//!
//! Reports are produced asynchronously by the API:
//!
//! ```text
//! submit ──► PROCESSING ──poll/wait──► PROCESSING ... ──► SUCCEEDED ──► download ──► unzip
//!    │                                             └────► FAILED (fatal)
//!    └──► "date should be in the past" ──► DateRejected
//! ```
//!
//! [`ReportClient`] owns the credentials, the bearer token and the HTTP
//! session, and drives one job per call to
//! [`ReportSource::download_report`].

mod archive;
mod client;
mod job;
mod types;

pub use archive::extract_first_file;
pub use client::{ReportClient, ReportSource};
pub use job::JobLifecycle;
pub use types::{
    DownloadedReport, JobPollConfig, JobStatus, ReportFile, ReportJob, ReportOutcome,
    DATE_REJECTED_PHRASE,
};
