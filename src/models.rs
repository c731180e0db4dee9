//! Record types for the mail.tm JSON API.
//!
//! Collections are wrapped in Hydra envelopes; [`HydraCollection`] unwraps the
//! `hydra:member` array and treats a missing array as empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Hydra collection envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct HydraCollection<T> {
    /// The items of this page.
    #[serde(rename = "hydra:member", default = "Vec::new")]
    pub members: Vec<T>,
    /// Total number of items reported by the server.
    #[serde(rename = "hydra:totalItems", default)]
    pub total_items: Option<u64>,
}

/// A mail domain accounts can be created under.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Domain name, e.g. `example.com`. Entries without one are ignored.
    #[serde(default)]
    pub domain: Option<String>,
    /// Whether the domain accepts new accounts.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Body of `POST /accounts` and `POST /token`.
#[derive(Debug, Serialize)]
pub(crate) struct AccountRequest<'a> {
    pub address: &'a str,
    pub password: &'a str,
}

/// An account as returned by `POST /accounts`.
///
/// Every field is optional; a successful status is what counts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Server-side account id.
    #[serde(default)]
    pub id: Option<String>,
    /// Account address.
    #[serde(default)]
    pub address: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response of `POST /token`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Sender or recipient of a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailAddress {
    /// The address.
    #[serde(default)]
    pub address: Option<String>,
    /// Display name, often empty.
    #[serde(default)]
    pub name: Option<String>,
}

/// A message as it appears in `GET /messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    /// Message id. Entries without one are skipped by the poller.
    #[serde(default)]
    pub id: Option<String>,
    /// Sender.
    #[serde(default)]
    pub from: Option<MailAddress>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Short plain-text preview of the body.
    #[serde(default)]
    pub intro: Option<String>,
    /// Time the message was received.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MessageSummary {
    /// Returns the id, or `None` when it is missing or empty.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Returns the sender address, or `(unknown)`.
    #[must_use]
    pub fn from_address(&self) -> &str {
        self.from
            .as_ref()
            .and_then(|f| f.address.as_deref())
            .unwrap_or("(unknown)")
    }

    /// Returns the subject, or `(no subject)`.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("(no subject)")
    }

    /// Returns the intro snippet, or an empty string.
    #[must_use]
    pub fn intro(&self) -> &str {
        self.intro.as_deref().unwrap_or_default()
    }
}

/// A message as returned by `GET /messages/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDetail {
    /// Message id.
    #[serde(default)]
    pub id: Option<String>,
    /// Plain-text body.
    #[serde(default)]
    pub text: Option<String>,
    /// HTML body parts.
    #[serde(default)]
    pub html: HtmlBody,
}

impl MessageDetail {
    /// Returns the text body, or an empty string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// HTML body, which the API sends either as a list of parts or a single string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HtmlBody {
    /// List of HTML parts.
    Parts(Vec<String>),
    /// A single HTML document.
    Single(String),
    /// Explicit `null`.
    Null(()),
}

impl Default for HtmlBody {
    fn default() -> Self {
        HtmlBody::Parts(Vec::new())
    }
}

impl HtmlBody {
    /// Returns `true` if any non-empty HTML content is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            HtmlBody::Parts(parts) => parts.iter().any(|p| !p.is_empty()),
            HtmlBody::Single(html) => !html.is_empty(),
            HtmlBody::Null(()) => false,
        }
    }
}
