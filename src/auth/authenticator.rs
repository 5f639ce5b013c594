//! Authenticator implementation
//!
//! Exchanges the client credentials for a bearer token.

use super::types::{AccessToken, Credentials, TokenResponse};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tracing::info;

/// Token endpoint, relative to the API root
pub const TOKEN_PATH: &str = "api/v1/oauth/token";

/// Obtains access tokens for a set of credentials
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Log in and return a fresh token
    ///
    /// 429/502 are retried with backoff; any other non-2xx ends the run.
    pub async fn authorize(&self, http: &HttpClient) -> Result<AccessToken> {
        let token = http
            .with_retry("authorize", || self.request_token(http))
            .await?;
        info!("authorized client {}", self.credentials.client_id);
        Ok(token)
    }

    async fn request_token(&self, http: &HttpClient) -> Result<AccessToken> {
        let req = http
            .request(Method::POST, TOKEN_PATH)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .header(CONTENT_TYPE, "application/json");

        let response = http.execute("authorize", req).await?;
        let body: TokenResponse = response.json().await?;

        if body.access_token.is_empty() {
            return Err(Error::auth("token response carried an empty access_token"));
        }

        Ok(AccessToken::new(body.access_token))
    }
}
