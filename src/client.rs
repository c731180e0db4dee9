//! HTTP client for the mail.tm API.
//!
//! The [`MailTmClient`] wraps a [`reqwest::Client`] and exposes one method per
//! API call. Every call is a single request: non-2xx responses become
//! [`Error::Status`], transport failures become [`Error::Request`], and nothing
//! is retried.
//!
//! # Example
//!
//! ```no_run
//! use mailtm_otp::{MailTmClient, MailTmConfig};
//!
//! # async fn example() -> mailtm_otp::Result<()> {
//! let config = MailTmConfig::builder().build()?;
//! let client = MailTmClient::new(&config)?;
//!
//! let domains = client.list_domains().await?;
//! println!("Available domains: {domains:?}");
//! # Ok(())
//! # }
//! ```

use crate::config::{Credentials, MailTmConfig};
use crate::error::{Error, Result};
use crate::models::{
    Account, AccountRequest, Domain, HydraCollection, MessageDetail, MessageSummary,
    TokenResponse,
};
use reqwest::{Method, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

/// Async client for the mail.tm REST API.
///
/// Create using [`MailTmClient::new`]. Cloning is cheap; clones share the
/// connection pool.
#[derive(Clone)]
pub struct MailTmClient {
    http: reqwest::Client,
    base_url: String,
}

impl MailTmClient {
    /// Builds a client from the configured base URL, timeouts and proxy.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy is invalid or the HTTP client cannot be built.
    pub fn new(config: &MailTmConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .user_agent(concat!("mailtm-otp/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy) = &config.proxy {
            debug!(proxy = %proxy, "Routing API traffic through proxy");
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let http = builder
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        debug!(
            base_url = %config.base_url,
            proxy_enabled = config.proxy.is_some(),
            "HTTP client ready"
        );

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the domain names accounts can be created under.
    ///
    /// Entries without a domain name are dropped. An empty list is returned as
    /// is; callers decide whether that is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-2xx status.
    #[instrument(name = "MailTmClient::list_domains", skip(self))]
    pub async fn list_domains(&self) -> Result<Vec<String>> {
        let page: HydraCollection<Domain> = self.get("/domains", None).await?;

        let domains: Vec<String> = page
            .members
            .into_iter()
            .filter_map(|d| d.domain)
            .filter(|d| !d.is_empty())
            .collect();

        debug!(count = domains.len(), "Listed domains");
        Ok(domains)
    }

    /// Creates an account with the given credentials.
    ///
    /// Any 2xx status counts as created. A body that does not decode yields
    /// an empty [`Account`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] if the API rejects the account (for example
    /// because the address is taken).
    #[instrument(
        name = "MailTmClient::create_account",
        skip_all,
        fields(address = %credentials.address())
    )]
    pub async fn create_account(&self, credentials: &Credentials) -> Result<Account> {
        let body = AccountRequest {
            address: credentials.address(),
            password: credentials.password(),
        };
        let path = "/accounts";
        let request = self.request(Method::POST, path, None).json(&body);
        let response = Self::execute(request, "POST", path).await?;

        match response.json::<Account>().await {
            Ok(account) => Ok(account),
            Err(e) => {
                debug!(error = %e, "Account created, response body not decoded");
                Ok(Account::default())
            }
        }
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] if the response has no token, or a
    /// request error if the call fails.
    #[instrument(
        name = "MailTmClient::token",
        skip_all,
        fields(address = %credentials.address())
    )]
    pub async fn token(&self, credentials: &Credentials) -> Result<SecretString> {
        let body = AccountRequest {
            address: credentials.address(),
            password: credentials.password(),
        };
        let response: TokenResponse = self.post("/token", &body).await?;

        response
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or(Error::MissingToken)
    }

    /// Fetches the current message list of the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-2xx status.
    #[instrument(name = "MailTmClient::messages", skip_all)]
    pub async fn messages(&self, token: &SecretString) -> Result<Vec<MessageSummary>> {
        let page: HydraCollection<MessageSummary> = self.get("/messages", Some(token)).await?;
        debug!(count = page.members.len(), "Listed messages");
        Ok(page.members)
    }

    /// Fetches the full body of one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-2xx status.
    #[instrument(name = "MailTmClient::message", skip(self, token))]
    pub async fn message(&self, token: &SecretString, id: &str) -> Result<MessageDetail> {
        self.get(&message_path(id), Some(token)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private methods
    // ─────────────────────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T> {
        let request = self.request(Method::GET, path, token);
        Self::send(request, "GET", path).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.request(Method::POST, path, None).json(body);
        Self::send(request, "POST", path).await
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> RequestBuilder {
        let request = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json");

        match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        request: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<T> {
        let response = Self::execute(request, method, path).await?;

        response.json().await.map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn execute(
        request: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<Response> {
        let response = request.send().await.map_err(|source| Error::Request {
            method,
            path: path.to_string(),
            source,
        })?;

        Self::check_status(response, method, path).await
    }

    async fn check_status(
        response: Response,
        method: &'static str,
        path: &str,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            debug!(%status, method, path, "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Status {
            method,
            path: path.to_string(),
            status,
            body,
        })
    }
}

/// Builds `/messages/{id}` with `id` percent-encoded as a single segment.
fn message_path(id: &str) -> String {
    let mut url = Url::parse("http://localhost/messages").expect("valid URL");
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(id);
    }
    url.path().to_string()
}

impl std::fmt::Debug for MailTmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailTmClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
