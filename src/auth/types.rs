//! Auth types

use serde::Deserialize;

/// API credentials and the shop they act for
///
/// Immutable for the lifetime of the process.
#[derive(Clone, Default)]
pub struct Credentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Shop identifier used in every report path
    pub shop_id: String,
    /// Site sent with report requests
    pub site: String,
    /// Optional `User-Agent` header
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("shop_id", &self.shop_id)
            .field("site", &self.site)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Opaque bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Body of a successful token response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The bearer token
    pub access_token: String,
}
