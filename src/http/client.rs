//! HTTP client with retry and backoff
//!
//! Wraps a single `reqwest::Client` (one connection pool for the whole
//! run) and adds:
//! - Base URL handling
//! - The optional `User-Agent` header
//! - Request timing logs
//! - Rate limit classification and exponential backoff

use super::rate_limit::ResponseClass;
use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Attempts per retried operation, first try included
    pub max_attempts: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// User agent string, only sent when set
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(300),
            max_attempts: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(600),
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the first backoff delay and its cap
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and backoff
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Start a request against a path relative to the base URL
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.build_url(path))
    }

    /// Send a request, logging its timing
    ///
    /// Rate limited responses come back as [`Error::RateLimited`]; every
    /// other status is returned to the caller untouched so it can inspect
    /// the body before deciding (see [`error_for_status`]).
    pub async fn send(&self, endpoint: &str, req: RequestBuilder) -> Result<Response> {
        let started = Instant::now();
        let response = req.send().await?;
        let status = response.status();

        debug!(
            endpoint,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "http_request_timer"
        );

        if ResponseClass::of(status).is_retryable() {
            return Err(Error::rate_limited(endpoint, status.as_u16()));
        }
        Ok(response)
    }

    /// Send a request and fail on any non-2xx status
    pub async fn execute(&self, endpoint: &str, req: RequestBuilder) -> Result<Response> {
        let response = self.send(endpoint, req).await?;
        error_for_status(response).await
    }

    /// Run an operation, retrying it while it reports a rate limit
    ///
    /// The whole operation is re-run, so it must be safe to repeat. After
    /// `max_attempts` rate limited tries the run gives up with
    /// [`Error::RetriesExhausted`]. Any other error is returned at once.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Err(e) if e.is_rate_limited() => {
                    if attempt >= max_attempts {
                        error!("{operation}: giving up after {attempt} rate limited attempts");
                        return Err(Error::RetriesExhausted {
                            operation: operation.to_string(),
                            attempts: attempt,
                        });
                    }

                    let delay = self.calculate_backoff(attempt - 1);
                    warn!(
                        "{e}, attempt {}/{}, backing off {:?}",
                        attempt, max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Exponential backoff delay for a zero-based retry `attempt`, capped at `max_backoff`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self
            .config
            .initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.config.max_backoff);

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Turn a non-2xx response into [`Error::HttpStatus`] carrying the body
pub async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::http_status(status.as_u16(), body))
}

/// Fail with [`Error::HttpStatus`] unless `status` is 2xx, for callers that already read the body
pub fn ensure_success(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::http_status(status.as_u16(), body))
    }
}
