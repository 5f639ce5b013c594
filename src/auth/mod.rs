//! Authentication module
//!
//! The report API uses an OAuth2 client credentials style login: the
//! client id and secret go out as HTTP Basic auth, the response carries
//! a bearer token used for every later call.
//!
//! The token is fetched once per run. There is no refresh: a run that
//! outlives the token fails on the next call with a fatal 401.

mod authenticator;
mod types;

pub use authenticator::{Authenticator, TOKEN_PATH};
pub use types::{AccessToken, Credentials, TokenResponse};
