//! Authenticated sessions.
//!
//! A [`Session`] pairs an account address with the bearer token issued for it.
//! The token lives as long as the session and is never refreshed.

use crate::client::MailTmClient;
use crate::config::Credentials;
use crate::error::Result;
use secrecy::SecretString;
use tracing::{debug, instrument};

/// An authenticated account.
pub struct Session {
    address: String,
    token: SecretString,
}

impl Session {
    /// Creates a session from an already issued token.
    #[must_use]
    pub fn new(address: impl Into<String>, token: SecretString) -> Self {
        Self {
            address: address.into(),
            token,
        }
    }

    /// Returns the account address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Exchanges credentials for a token.
///
/// One request, no retry.
///
/// # Errors
///
/// Returns [`Error::MissingToken`](crate::Error::MissingToken) if the response
/// carries no token, or the request error if the exchange fails.
#[instrument(
    name = "session::authenticate",
    skip_all,
    fields(address = %credentials.address())
)]
pub async fn authenticate(client: &MailTmClient, credentials: &Credentials) -> Result<Session> {
    debug!("Requesting token");

    let token = client.token(credentials).await?;

    debug!("Token received");
    Ok(Session::new(credentials.address(), token))
}
