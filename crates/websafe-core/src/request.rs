//! Request URL validation
//!
//! Callers validate and normalize URLs before handing them to the extractor;
//! the extractor itself never rejects input.

use crate::{Error, Result};
use url::Url;

/// Scheme prepended to URLs submitted without one
pub const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Validate a user-submitted URL and return the normalized form to score.
///
/// Surrounding whitespace is trimmed and a missing scheme defaults to
/// `http://`. The result must parse with an `http` or `https` scheme and a
/// host. The returned string keeps the caller's spelling (no re-serialization
/// through the parser) so lexical features see what the user submitted.
pub fn validate_request_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_url("URL is required"));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| Error::invalid_url(format!("{}: {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::invalid_url(format!(
                "scheme '{}' is not supported",
                scheme
            )))
        }
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(candidate),
        _ => Err(Error::invalid_url(format!("{}: missing host", trimmed))),
    }
}

fn has_scheme(s: &str) -> bool {
    s.find("://").is_some_and(|idx| {
        idx > 0
            && s[..idx]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
