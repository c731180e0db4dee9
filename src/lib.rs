//! # mailtm-otp
//!
//! Async client for disposable [mail.tm](https://mail.tm) inboxes that polls for new
//! messages and extracts one-time codes from them.
//!
//! This crate provides a high-level, async API for:
//! - Provisioning a throwaway account (or reusing an existing one)
//! - Exchanging credentials for a bearer token
//! - Polling the inbox at a fixed interval and reporting each new message once
//! - Extracting 4 to 8 digit codes from message bodies
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailtm_otp::{authenticate, provision, InboxPoller, MailTmClient, MailTmConfig, PollEvent};
//!
//! # async fn example() -> mailtm_otp::Result<()> {
//! // Reads MAILTM_* variables, POLL_SECONDS and MAX_POLLS
//! let config = MailTmConfig::from_env()?;
//! let client = MailTmClient::new(&config)?;
//!
//! // Pick a domain and create an account
//! let provisioned = provision(&client, &config).await?;
//! let session = authenticate(&client, &provisioned.credentials).await?;
//! println!("Inbox: {}", session.address());
//!
//! let mut poller = InboxPoller::new(&client, &session, config.polling.clone());
//! poller
//!     .run(|event| {
//!         if let PollEvent::Message(report) = event {
//!             if let Some(code) = report.code() {
//!                 println!("Got code: {code}");
//!             }
//!         }
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using a SOCKS5 Proxy
//!
//! ```no_run
//! use mailtm_otp::{MailTmClient, MailTmConfig, Socks5Proxy};
//!
//! # fn example() -> mailtm_otp::Result<()> {
//! let config = MailTmConfig::builder()
//!     .proxy(Socks5Proxy::with_auth("proxy.example.com", 1080, "user", "pass"))
//!     .build()?;
//!
//! let client = MailTmClient::new(&config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use [`Error::is_retryable`]
//! to determine if an operation can be retried:
//!
//! ```
//! use mailtm_otp::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, can retry: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. Spans are no-ops until a
//! subscriber is installed.
//!
//! ### Span Naming Convention
//!
//! - `MailTmClient::list_domains` - Domain listing
//! - `MailTmClient::create_account` - Account creation
//! - `MailTmClient::token` - Token exchange
//! - `MailTmClient::messages` / `MailTmClient::message` - Inbox reads
//! - `provision::provision` - Domain choice and account provisioning
//! - `session::authenticate` - Authentication
//! - `InboxPoller::run` - The poll loop
//!
//! ### Standard Fields
//!
//! - `address` - Account address
//! - `base_url` - API endpoint
//! - `proxy_enabled` - Whether proxy is used
//! - `id` - Message id

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod poller;
pub mod provision;
pub mod proxy;
pub mod report;
pub mod session;

// Internal modules
mod client;

// Re-exports for ergonomic API
pub use client::MailTmClient;
pub use config::{Credentials, MailTmConfig, MailTmConfigBuilder, PollingConfig, TimeoutConfig};
pub use email_address::EmailAddress;
pub use error::{Error, ErrorCategory, Result};
pub use poller::{InboxPoller, PollEvent, PollState, PollSummary, SeenIds};
pub use provision::{provision, AccountStatus, Provisioned};
pub use proxy::{ProxyAuth, Socks5Proxy};
pub use report::MessageReport;
pub use session::{authenticate, Session};
