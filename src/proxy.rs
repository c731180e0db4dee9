//! SOCKS5 proxy configuration for API traffic.
//!
//! All requests made by [`MailTmClient`](crate::MailTmClient) can be routed
//! through a SOCKS5 proxy. Hostnames are resolved by the proxy (`socks5h`).
//!
//! # Example
//!
//! ```
//! use mailtm_otp::Socks5Proxy;
//!
//! // Without authentication
//! let proxy = Socks5Proxy::new("proxy.example.com", 1080);
//!
//! // With authentication
//! let proxy = Socks5Proxy::with_auth("proxy.example.com", 1080, "username", "password");
//!
//! // From the `MAILTM_PROXY` notation
//! let proxy: Socks5Proxy = "user:pass@proxy.example.com:1080".parse().unwrap();
//! ```

use crate::error::{Error, Result};
use std::str::FromStr;

/// SOCKS5 proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Socks5Proxy {
    /// Proxy server hostname or IP address.
    pub host: String,
    /// Proxy server port.
    pub port: u16,
    /// Optional authentication credentials.
    pub auth: Option<ProxyAuth>,
}

/// Authentication credentials for SOCKS5 proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    /// Username for proxy authentication.
    pub username: String,
    /// Password for proxy authentication.
    pub password: String,
}

impl Socks5Proxy {
    /// Creates a new SOCKS5 proxy configuration without authentication.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
        }
    }

    /// Creates a new SOCKS5 proxy configuration with authentication.
    #[must_use]
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            auth: Some(ProxyAuth {
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    /// Returns the proxy address as "host:port".
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `true` if this proxy requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Converts this configuration into a [`reqwest::Proxy`] covering all schemes.
    ///
    /// Credentials are percent-encoded into the proxy URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the host cannot form a valid URL.
    pub fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let invalid = |message: String| Error::InvalidConfig { message };

        let mut url = reqwest::Url::parse(&format!("socks5h://{}", self.address()))
            .map_err(|e| invalid(format!("invalid proxy address '{}': {e}", self.address())))?;

        if let Some(auth) = &self.auth {
            url.set_username(&auth.username)
                .map_err(|()| invalid("proxy username cannot be set".into()))?;
            url.set_password(Some(&auth.password))
                .map_err(|()| invalid("proxy password cannot be set".into()))?;
        }

        reqwest::Proxy::all(url).map_err(|e| invalid(format!("invalid proxy: {e}")))
    }
}

impl FromStr for Socks5Proxy {
    type Err = Error;

    /// Parses `host:port` or `user:pass@host:port`, with an optional
    /// `socks5://` or `socks5h://` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidConfig {
            message: format!("invalid proxy '{s}', expected [user:pass@]host:port"),
        };

        let rest = s
            .trim()
            .trim_start_matches("socks5h://")
            .trim_start_matches("socks5://");

        let (auth, host_port) = match rest.rsplit_once('@') {
            Some((creds, host_port)) => {
                let (user, pass) = creds.split_once(':').ok_or_else(invalid)?;
                (Some((user, pass)), host_port)
            }
            None => (None, rest),
        };

        let (host, port) = host_port.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;

        Ok(match auth {
            Some((user, pass)) => Self::with_auth(host, port, user, pass),
            None => Self::new(host, port),
        })
    }
}

impl std::fmt::Display for Socks5Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.auth {
            Some(auth) => write!(
                f,
                "socks5://{}:***@{}:{}",
                auth.username, self.host, self.port
            ),
            None => write!(f, "socks5://{}:{}", self.host, self.port),
        }
    }
}
