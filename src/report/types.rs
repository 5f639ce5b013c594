//! Report job types

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

/// Text the API puts in the submission response when `to` is not in the past
pub const DATE_REJECTED_PHRASE: &str = "The date should be in the past";

/// Remote job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Still being generated
    Processing,
    /// Generation failed, terminal
    Failed,
    /// Ready for download, terminal
    Succeeded,
}

impl JobStatus {
    /// Check if the job reached a terminal state
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// A report job as returned by submission and polling
#[derive(Debug, Clone, Deserialize)]
pub struct ReportJob {
    /// Job id assigned by the API
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Current status
    pub status: JobStatus,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid report id: {other}"
        ))),
    }
}

/// Polling behaviour while a job is processing
#[derive(Debug, Clone)]
pub struct JobPollConfig {
    /// Wait between two status polls
    pub interval: Duration,
    /// Give up after this long; `None` polls until the job ends
    pub max_wait: Option<Duration>,
}

impl Default for JobPollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Some(Duration::from_secs(3600)),
        }
    }
}

/// The file extracted from a report archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    /// Entry name inside the archive
    pub name: String,
    /// Decoded text content
    pub content: String,
}

/// A completed download and how long the job took to get there
#[derive(Debug, Clone)]
pub struct DownloadedReport {
    /// Job id
    pub job_id: String,
    /// Extracted CSV file
    pub file: ReportFile,
    /// Status polls issued after submission
    pub polls: u32,
    /// Poll interval waits taken
    pub waits: u32,
}

/// Result of asking for a report
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    /// The job succeeded and its file was downloaded
    Downloaded(DownloadedReport),
    /// The API refused the end date as not being in the past
    DateRejected,
}
