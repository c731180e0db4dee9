//! Human-readable reports for the console.

use crate::matcher::extract_from_message;
use crate::models::{MessageDetail, MessageSummary};
use std::fmt;

/// Number of body characters shown when no code is found.
pub const EXCERPT_CHARS: usize = 300;

const SEPARATOR: &str = "==============================";

/// Masks a password for display.
///
/// Keeps the first two and last two characters of passwords with at least
/// four characters; shorter passwords are replaced entirely.
///
/// ```
/// use mailtm_otp::report::mask_password;
///
/// assert_eq!(mask_password("abcdefgh"), "ab****gh");
/// assert_eq!(mask_password("abc"), "***");
/// ```
#[must_use]
pub fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    if chars.len() < 4 {
        return "***".to_string();
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

/// Returns the first [`EXCERPT_CHARS`] characters of `text`, or a placeholder.
#[must_use]
pub fn body_excerpt(text: &str) -> String {
    if text.is_empty() {
        "(no text body)".to_string()
    } else {
        text.chars().take(EXCERPT_CHARS).collect()
    }
}

/// Result of running code extraction over one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    /// A code was found.
    Found(String),
    /// No code; carries a body excerpt instead.
    NotDetected {
        /// Start of the text body.
        excerpt: String,
    },
}

/// Everything printed for one newly seen message.
#[derive(Debug, Clone)]
pub struct MessageReport {
    /// The list entry.
    pub summary: MessageSummary,
    /// Extraction result.
    pub outcome: CodeOutcome,
    /// Whether the message has an HTML body.
    pub has_html: bool,
}

impl MessageReport {
    /// Extracts a code from the detail text, then the summary intro.
    #[must_use]
    pub fn new(summary: MessageSummary, detail: &MessageDetail) -> Self {
        let outcome = match extract_from_message(detail.text(), summary.intro()) {
            Some(code) => CodeOutcome::Found(code),
            None => CodeOutcome::NotDetected {
                excerpt: body_excerpt(detail.text()),
            },
        };

        Self {
            summary,
            outcome,
            has_html: detail.html.is_present(),
        }
    }

    /// Returns the extracted code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match &self.outcome {
            CodeOutcome::Found(code) => Some(code),
            CodeOutcome::NotDetected { .. } => None,
        }
    }
}

/// Header lines printed as soon as a new message is seen.
impl fmt::Display for MessageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{SEPARATOR}")?;
        writeln!(f, "New message: {}", self.id().unwrap_or_default())?;
        let name = self
            .from
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .filter(|n| !n.is_empty());
        match name {
            Some(name) => writeln!(f, "From: {name} <{}>", self.from_address())?,
            None => writeln!(f, "From: {}", self.from_address())?,
        }
        writeln!(f, "Subject: {}", self.subject())?;
        if let Some(received) = self.created_at {
            writeln!(f, "Received: {}", received.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        write!(f, "Intro: {}", self.intro())
    }
}

/// Extraction result lines, printed once the body has been fetched.
impl fmt::Display for MessageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CodeOutcome::Found(code) => write!(f, "Code found: {code}")?,
            CodeOutcome::NotDetected { excerpt } => {
                writeln!(
                    f,
                    "No code detected. First {EXCERPT_CHARS} characters of body:"
                )?;
                write!(f, "{excerpt}")?;
            }
        }

        if self.has_html {
            write!(f, "\nHTML body exists (not printed).")?;
        }
        Ok(())
    }
}

/// Closing line printed after a batch of new messages.
#[must_use]
pub fn batch_separator() -> &'static str {
    SEPARATOR
}
