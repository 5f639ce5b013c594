//! Report job lifecycle
//!
//! One pass of submit → poll → download for a date range. Rate limits
//! surface as [`Error::RateLimited`] from any step; the caller retries the
//! whole pass, which is safe because submitting the same range again just
//! creates a new job.

use super::archive::extract_first_file;
use super::types::{
    DownloadedReport, JobPollConfig, JobStatus, ReportFile, ReportJob, ReportOutcome,
    DATE_REJECTED_PHRASE,
};
use crate::auth::{AccessToken, Credentials};
use crate::error::{Error, Result};
use crate::http::{ensure_success, HttpClient};
use crate::types::format_report_date;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info};

/// Drives a single report job to completion
pub struct JobLifecycle<'a> {
    http: &'a HttpClient,
    token: &'a AccessToken,
    credentials: &'a Credentials,
    poll: &'a JobPollConfig,
}

impl<'a> JobLifecycle<'a> {
    /// Create a lifecycle bound to an authorized session
    pub fn new(
        http: &'a HttpClient,
        token: &'a AccessToken,
        credentials: &'a Credentials,
        poll: &'a JobPollConfig,
    ) -> Self {
        Self {
            http,
            token,
            credentials,
            poll,
        }
    }

    fn reports_path(&self) -> String {
        format!("api/v1/shops/{}/click-reports", self.credentials.shop_id)
    }

    /// Submit, wait for and download a report covering `[start, end]`
    pub async fn run(&self, start: NaiveDate, end: NaiveDate) -> Result<ReportOutcome> {
        let Some(mut job) = self.submit(start, end).await? else {
            return Ok(ReportOutcome::DateRejected);
        };

        let started = Instant::now();
        let mut polls = 0;
        let mut waits = 0;

        while !job.status.is_terminal() {
            if let Some(max_wait) = self.poll.max_wait {
                if started.elapsed() >= max_wait {
                    return Err(Error::JobTimeout {
                        job_id: job.id,
                        waited_secs: started.elapsed().as_secs(),
                    });
                }
            }

            info!("checking whether report {} is ready", job.id);
            job = self.status(&job.id).await?;
            polls += 1;

            if !job.status.is_terminal() {
                debug!("report {} still processing, waiting {:?}", job.id, self.poll.interval);
                tokio::time::sleep(self.poll.interval).await;
                waits += 1;
            }
        }

        if job.status == JobStatus::Failed {
            return Err(Error::JobFailed { job_id: job.id });
        }

        let file = self.download(&job.id).await?;
        Ok(ReportOutcome::Downloaded(DownloadedReport {
            job_id: job.id,
            file,
            polls,
            waits,
        }))
    }

    /// Submit a report job; `None` when the end date was rejected
    pub async fn submit(&self, start: NaiveDate, end: NaiveDate) -> Result<Option<ReportJob>> {
        let body = json!({
            "from": format_report_date(start),
            "to": format_report_date(end),
            "site": self.credentials.site,
        });

        let req = self
            .http
            .request(Method::POST, &self.reports_path())
            .bearer_auth(self.token.as_str())
            .json(&body);

        let response = self.http.send("create_report", req).await?;
        let status = response.status();
        let text = response.text().await?;

        if text.contains(DATE_REJECTED_PHRASE) {
            info!("end date {end} rejected as not in the past");
            return Ok(None);
        }

        ensure_success(status, &text)?;
        debug!("report job submitted: {text}");
        parse_job(&text).map(Some)
    }

    /// Fetch the current state of a job
    pub async fn status(&self, job_id: &str) -> Result<ReportJob> {
        let path = format!("{}/{job_id}", self.reports_path());
        let req = self
            .http
            .request(Method::GET, &path)
            .bearer_auth(self.token.as_str());

        let response = self.http.execute("poll_report_status", req).await?;
        let text = response.text().await?;
        debug!("report job status: {text}");
        parse_job(&text)
    }

    /// Download a finished job and extract its file
    pub async fn download(&self, job_id: &str) -> Result<ReportFile> {
        let path = format!("{}/{job_id}/download", self.reports_path());
        let req = self
            .http
            .request(Method::GET, &path)
            .bearer_auth(self.token.as_str());

        let response = self.http.execute("download_report", req).await?;
        let data = response.bytes().await?;
        debug!("downloaded {} bytes for report {job_id}", data.len());
        extract_first_file(data)
    }
}

fn parse_job(text: &str) -> Result<ReportJob> {
    serde_json::from_str(text)
        .map_err(|e| Error::decode(format!("Unexpected report job response: {e}")))
}
