//! Authorized report client

use super::job::JobLifecycle;
use super::types::{JobPollConfig, ReportOutcome};
use crate::auth::{AccessToken, Authenticator, Credentials};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Anything that can produce a click report for a date range
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Produce the report for `[start, end]`, or `DateRejected` when the
    /// API refuses `end` as not being in the past
    async fn download_report(&self, start: NaiveDate, end: NaiveDate) -> Result<ReportOutcome>;
}

/// Client holding an authorized session against the report API
///
/// The token is obtained once in [`ReportClient::connect`] and reused for
/// every call. Every operation is retried on 429/502 with exponential
/// backoff.
pub struct ReportClient {
    http: HttpClient,
    credentials: Credentials,
    token: AccessToken,
    poll: JobPollConfig,
}

impl ReportClient {
    /// Build the HTTP session and authorize
    pub async fn connect(
        credentials: Credentials,
        http_config: HttpClientConfig,
        poll: JobPollConfig,
    ) -> Result<Self> {
        let http = HttpClient::with_config(http_config)?;
        let token = Authenticator::new(credentials.clone())
            .authorize(&http)
            .await?;

        Ok(Self {
            http,
            credentials,
            token,
            poll,
        })
    }

    /// Lifecycle helper bound to this session
    pub fn lifecycle(&self) -> JobLifecycle<'_> {
        JobLifecycle::new(&self.http, &self.token, &self.credentials, &self.poll)
    }

    /// Generic authenticated JSON GET
    ///
    /// `url` defaults to the shop's click report collection. `stream_id`
    /// names the call in timing logs.
    pub async fn request(
        &self,
        stream_id: &str,
        params: &HashMap<String, String>,
        url: Option<&str>,
    ) -> Result<Value> {
        let default_url = format!("api/v1/shops/{}/click-reports", self.credentials.shop_id);
        let url = url.unwrap_or(&default_url);

        self.http
            .with_retry(stream_id, || async {
                let mut req = self
                    .http
                    .request(Method::GET, url)
                    .bearer_auth(self.token.as_str());
                if !params.is_empty() {
                    req = req.query(params);
                }

                let response = self.http.execute(stream_id, req).await?;
                let body: Value = response.json().await?;
                debug!("{stream_id} response: {body}");
                Ok(body)
            })
            .await
    }
}

#[async_trait]
impl ReportSource for ReportClient {
    async fn download_report(&self, start: NaiveDate, end: NaiveDate) -> Result<ReportOutcome> {
        self.http
            .with_retry("download_report", || async move {
                self.lifecycle().run(start, end).await
            })
            .await
    }
}

impl std::fmt::Debug for ReportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportClient")
            .field("http", &self.http)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
