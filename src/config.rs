//! Configuration for the mail.tm client and poll loop.
//!
//! Use [`MailTmConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use mailtm_otp::MailTmConfig;
//!
//! let config = MailTmConfig::builder()
//!     .domain("example.com")
//!     .username_prefix("signup")
//!     .build()
//!     .expect("valid config");
//! ```
//!
//! Or read it from the environment with [`MailTmConfig::from_env`].

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use email_address::EmailAddress;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::warn;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mail.tm";

/// Username prefix used when none is configured.
pub const DEFAULT_USERNAME_PREFIX: &str = "user";

/// Environment variable names read by [`MailTmConfig::from_env`].
pub mod env_vars {
    /// Existing account address.
    pub const ADDRESS: &str = "MAILTM_ADDRESS";
    /// Existing account password.
    pub const PASSWORD: &str = "MAILTM_PASSWORD";
    /// Desired mail domain.
    pub const DOMAIN: &str = "MAILTM_DOMAIN";
    /// Prefix for generated usernames.
    pub const USERNAME_PREFIX: &str = "MAILTM_USERNAME_PREFIX";
    /// API base URL.
    pub const BASE_URL: &str = "MAILTM_BASE_URL";
    /// SOCKS5 proxy.
    pub const PROXY: &str = "MAILTM_PROXY";
    /// Seconds between polls.
    pub const POLL_SECONDS: &str = "POLL_SECONDS";
    /// Number of polls.
    pub const MAX_POLLS: &str = "MAX_POLLS";
}

/// An account address and password.
///
/// The password is stored as a [`SecretString`] and redacted from `Debug`.
#[derive(Clone)]
pub struct Credentials {
    address: String,
    password: SecretString,
}

impl Credentials {
    /// Creates credentials without validating the address.
    #[must_use]
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the account address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the password.
    ///
    /// Exposes the secret; keep it out of logs and spans.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for provisioning, authenticating and polling.
///
/// Create using [`MailTmConfig::builder()`] or [`MailTmConfig::from_env()`].
#[derive(Debug, Clone)]
pub struct MailTmConfig {
    /// Pre-existing account; when absent a new account is generated.
    pub credentials: Option<Credentials>,
    /// Desired mail domain.
    pub domain: Option<String>,
    /// Prefix for generated usernames.
    pub username_prefix: String,
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Optional SOCKS5 proxy for all API requests.
    pub proxy: Option<Socks5Proxy>,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Polling configuration.
    pub polling: PollingConfig,
}

/// HTTP timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Total time allowed for a single request.
    pub request: Duration,
    /// Time allowed to establish the TCP/TLS connection.
    pub connect: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            connect: Duration::from_secs(10),
        }
    }
}

/// Polling configuration for the inbox loop.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval between polls.
    pub interval: Duration,
    /// Number of polls before the loop ends.
    pub max_polls: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: 30,
        }
    }
}

impl MailTmConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> MailTmConfigBuilder {
        MailTmConfigBuilder::default()
    }

    /// Reads the configuration from environment variables.
    ///
    /// See [`env_vars`] for the names. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a supplied address or proxy is malformed.
    pub fn from_env() -> Result<Self> {
        MailTmConfigBuilder::from_env().build()
    }

    /// Builds the full URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Validates an email address format.
fn validate_email(email: &str) -> Result<EmailAddress> {
    EmailAddress::parse_with_options(email, email_address::Options::default()).map_err(|_| {
        Error::InvalidEmailFormat {
            email: email.to_string(),
        }
    })
}

/// Builder for [`MailTmConfig`].
#[derive(Debug, Default)]
pub struct MailTmConfigBuilder {
    address: Option<String>,
    password: Option<String>,
    domain: Option<String>,
    username_prefix: Option<String>,
    base_url: Option<String>,
    proxy: Option<String>,
    proxy_parsed: Option<Socks5Proxy>,
    timeouts: Option<TimeoutConfig>,
    polling: Option<PollingConfig>,
}

impl MailTmConfigBuilder {
    /// Creates a builder pre-filled from environment variables.
    ///
    /// Unparsable numeric values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a builder from an arbitrary variable lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = PollingConfig::default();
        let poll_seconds = parse_or_default(
            env_vars::POLL_SECONDS,
            var(env_vars::POLL_SECONDS),
            defaults.interval.as_secs(),
        );
        let max_polls = parse_or_default(
            env_vars::MAX_POLLS,
            var(env_vars::MAX_POLLS),
            defaults.max_polls,
        );

        Self {
            address: var(env_vars::ADDRESS),
            password: var(env_vars::PASSWORD),
            domain: var(env_vars::DOMAIN),
            username_prefix: var(env_vars::USERNAME_PREFIX),
            base_url: var(env_vars::BASE_URL),
            proxy: var(env_vars::PROXY),
            polling: Some(PollingConfig {
                interval: Duration::from_secs(poll_seconds),
                max_polls,
            }),
            ..Self::default()
        }
    }

    /// Sets the address of an existing account.
    ///
    /// Only used when a password is set as well.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the password of an existing account.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the desired mail domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the prefix for generated usernames.
    #[must_use]
    pub fn username_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.username_prefix = Some(prefix.into());
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a SOCKS5 proxy for all API requests.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy_parsed = Some(proxy);
        self.proxy = None;
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .request = timeout;
        self
    }

    /// Sets polling configuration.
    #[must_use]
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = Some(polling);
        self
    }

    /// Sets the interval between polls.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .interval = interval;
        self
    }

    /// Sets the number of polls.
    #[must_use]
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .max_polls = max_polls;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplied address, base URL or proxy is invalid.
    pub fn build(self) -> Result<MailTmConfig> {
        let non_empty =
            |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let credentials = match (non_empty(self.address), non_empty(self.password)) {
            (Some(address), Some(password)) => {
                validate_email(&address)?;
                Some(Credentials::new(address, password))
            }
            _ => None,
        };

        let base_url = non_empty(self.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        reqwest::Url::parse(&base_url).map_err(|e| Error::InvalidConfig {
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        let proxy = match (self.proxy_parsed, self.proxy) {
            (Some(proxy), _) => Some(proxy),
            (None, Some(raw)) => Some(raw.parse::<Socks5Proxy>()?),
            (None, None) => None,
        };

        Ok(MailTmConfig {
            credentials,
            domain: non_empty(self.domain),
            username_prefix: non_empty(self.username_prefix)
                .unwrap_or_else(|| DEFAULT_USERNAME_PREFIX.to_string()),
            base_url,
            proxy,
            timeouts: self.timeouts.unwrap_or_default(),
            polling: self.polling.unwrap_or_default(),
        })
    }
}

fn parse_or_default<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                variable = name,
                value = %raw,
                default = %default,
                "Unparsable value, using default"
            );
            default
        }),
    }
}
