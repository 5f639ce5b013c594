//! Tap configuration
//!
//! The config file carries the API credentials, the shop and site the
//! reports are requested for, the initial start date, and optional tuning
//! for timeouts, retries and job polling.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::report::JobPollConfig;
use crate::types::parse_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default API root of the idealo Business API
pub const DEFAULT_BASE_URL: &str = "https://businessapi.idealo.com/";

/// Complete tap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// OAuth client id
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_password: String,

    /// Shop the reports belong to
    #[serde(default)]
    pub shop_id: String,

    /// Site sent with every report request
    #[serde(default)]
    pub site: String,

    /// Initial watermark used when no bookmark exists
    #[serde(default)]
    pub start_date: String,

    /// Optional `User-Agent` header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per retried operation, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay; doubles after every rate limited attempt
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Upper bound for a single backoff delay
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Wait between two job status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Give up on a job still processing after this long (0 = never)
    #[serde(default = "default_max_poll_wait_secs")]
    pub max_poll_wait_secs: u64,

    /// How many end dates to try before giving up on a rejected range
    #[serde(default = "default_date_retry_attempts")]
    pub date_retry_attempts: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_max_attempts() -> u32 {
    10
}

fn default_backoff_base_secs() -> u64 {
    1
}

fn default_max_backoff_secs() -> u64 {
    600
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_max_poll_wait_secs() -> u64 {
    3600
}

fn default_date_retry_attempts() -> u32 {
    4
}

impl TapConfig {
    /// Load a config file; `.yaml` / `.yml` files are read as YAML, everything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and values that are parsed later
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("client_id", &self.client_id),
            ("client_password", &self.client_password),
            ("shop_id", &self.shop_id),
            ("site", &self.site),
            ("start_date", &self.start_date),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        if parse_datetime(&self.start_date).is_none() {
            return Err(Error::invalid_value(
                "start_date",
                format!("'{}' is not a valid date-time", self.start_date),
            ));
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;

        if self.max_attempts == 0 {
            return Err(Error::invalid_value("max_attempts", "must be at least 1"));
        }

        if self.date_retry_attempts == 0 {
            return Err(Error::invalid_value(
                "date_retry_attempts",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Parsed `start_date`
    pub fn start_datetime(&self) -> Result<DateTime<Utc>> {
        parse_datetime(&self.start_date).ok_or_else(|| {
            Error::invalid_value(
                "start_date",
                format!("'{}' is not a valid date-time", self.start_date),
            )
        })
    }

    /// Credentials handed to the report client
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_password.clone(),
            shop_id: self.shop_id.clone(),
            site: self.site.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    /// HTTP client settings derived from the tuning fields
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .max_attempts(self.max_attempts)
            .backoff(
                Duration::from_secs(self.backoff_base_secs),
                Duration::from_secs(self.max_backoff_secs),
            );

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }

    /// Job polling settings derived from the tuning fields
    pub fn poll_config(&self) -> JobPollConfig {
        JobPollConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: (self.max_poll_wait_secs > 0)
                .then(|| Duration::from_secs(self.max_poll_wait_secs)),
        }
    }
}
