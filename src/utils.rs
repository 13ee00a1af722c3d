//! Utility functions for URL resolution, publication dates, and logging.
//!
//! This module provides helper functions used throughout the application:
//! - Root-relative URL resolution against a listing page
//! - Parsing and rendering of `pubDate` timestamps
//! - String truncation for log output

use crate::errors::ResolveError;
use chrono::{DateTime, FixedOffset};
use url::Url;

/// Layout of every `pubDate` written to the feed (`Mon, 02 Jan 2006 15:04:05 -0700`).
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Resolve a possibly root-relative URL against the page it was found on.
///
/// Only candidates starting with `/` are resolved. Everything else,
/// including absolute URLs, bare relative paths like `rel` and dot paths
/// like `../x`, is returned verbatim.
///
/// # Arguments
///
/// * `base` - The URL of the page the candidate was found on
/// * `candidate` - The `href`/`src` value to resolve
///
/// # Errors
///
/// Returns [`ResolveError::InvalidBaseUrl`] if `base` cannot be parsed, or
/// [`ResolveError::InvalidRelativeUrl`] if `candidate` cannot be joined onto it.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(resolve_url("https://a.com/x/y", "/z")?, "https://a.com/z");
/// assert_eq!(resolve_url("https://a.com/x/y", "rel")?, "rel");
/// ```
pub fn resolve_url(base: &str, candidate: &str) -> Result<String, ResolveError> {
    if !candidate.starts_with('/') {
        return Ok(candidate.to_string());
    }

    let base_url = Url::parse(base).map_err(|source| ResolveError::InvalidBaseUrl {
        base: base.to_string(),
        source,
    })?;
    let resolved = base_url
        .join(candidate)
        .map_err(|source| ResolveError::InvalidRelativeUrl {
            candidate: candidate.to_string(),
            source,
        })?;

    Ok(resolved.to_string())
}

/// Parse an RFC 3339 timestamp such as `2024-05-01T10:15:30.123456789+02:00`.
///
/// Fractional seconds are optional; the UTC offset is required. The parsed
/// offset is kept so the rendered `pubDate` shows the page's own zone.
pub fn parse_pub_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).ok()
}

/// Render a timestamp in the fixed `pubDate` layout.
pub fn format_pub_date(date: &DateTime<FixedOffset>) -> String {
    date.format(PUB_DATE_FORMAT).to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
