//! One-time code extraction from message text.
//!
//! A code is the first standalone run of 4 to 8 digits.
//!
//! # Example
//!
//! ```
//! use mailtm_otp::matcher::{extract_code, extract_from_message};
//!
//! assert_eq!(extract_code("Your code is 482913, expires soon"), Some("482913"));
//! assert_eq!(extract_from_message("no digits", "PIN 7788").as_deref(), Some("7788"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest code accepted.
pub const MIN_CODE_DIGITS: usize = 4;

/// Longest code accepted.
pub const MAX_CODE_DIGITS: usize = 8;

/// Human-readable description of what is extracted, used in logging.
pub const CODE_DESCRIPTION: &str = "4-8 digit code";

// Word boundaries keep digits embedded in longer runs or glued to letters out.
static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(\d{{{MIN_CODE_DIGITS},{MAX_CODE_DIGITS}}})\b");
    Regex::new(&pattern).expect("valid regex")
});

/// Returns the first standalone run of 4 to 8 digits in `text`.
///
/// The first run by text position wins; no plausibility checks are made.
#[must_use]
pub fn extract_code(text: &str) -> Option<&str> {
    CODE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts a code from the body text first and the intro snippet second.
#[must_use]
pub fn extract_from_message(text: &str, intro: &str) -> Option<String> {
    [text, intro]
        .into_iter()
        .filter(|t| !t.is_empty())
        .find_map(extract_code)
        .map(str::to_string)
}
