//! Error types for the mailtm-otp crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the mail API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid email address format.
    #[error("invalid email format: {email}")]
    InvalidEmailFormat {
        /// The invalid email address.
        email: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("{method} {path} failed")]
    Request {
        /// HTTP method of the failed request.
        method: &'static str,
        /// API path of the failed request.
        path: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // API errors (retryable only for 429 / 5xx)
    // ─────────────────────────────────────────────────────────────────────────
    /// The API answered with a non-success status.
    #[error("{method} {path} returned {status}: {body}")]
    Status {
        /// HTTP method of the request.
        method: &'static str,
        /// API path of the request.
        path: String,
        /// Response status code.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Response shape errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// The response body did not match the expected schema.
    #[error("failed to decode response from {path}")]
    Decode {
        /// API path of the request.
        path: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The token endpoint answered without a token.
    #[error("token not found in response")]
    MissingToken,

    /// The API returned no mail domains.
    #[error("no domains returned by API")]
    NoDomains,
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// The crate itself never retries; this is exposed for callers that want to.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Request { .. } => true,
            Error::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }

            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::HttpClient { .. }
            | Error::Decode { .. }
            | Error::MissingToken
            | Error::NoDomains => false,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::HttpClient { .. } => ErrorCategory::Configuration,

            Error::Request { source, .. } if source.is_timeout() => ErrorCategory::Timeout,
            Error::Request { .. } => ErrorCategory::Network,

            Error::Status { .. } => ErrorCategory::Api,

            Error::Decode { .. } | Error::MissingToken => ErrorCategory::Protocol,

            Error::NoDomains => ErrorCategory::NotFound,
        }
    }

    /// Returns the HTTP status if this error came from an API response.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Network connectivity errors.
    Network,
    /// Request timeouts.
    Timeout,
    /// The API rejected the request.
    Api,
    /// The API answered with an unexpected shape.
    Protocol,
    /// Required remote data was absent.
    NotFound,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Api => write!(f, "api"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::NotFound => write!(f, "not_found"),
        }
    }
}
