//! Utility functions for slug derivation, string manipulation, date parsing,
//! and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Slug derivation for per-entity artifact filenames
//! - Commit-title truncation for readable digests
//! - Lenient timestamp parsing for the formats feeds actually publish
//! - File system validation for output directories

use std::fs as stdfs;
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use tokio::fs;
use tracing::{info, instrument};

/// Convert an entity name to a URL- and filename-safe slug.
///
/// The transformation, in order: lowercase, `&` becomes `and`, spaces become
/// hyphens, and everything outside `[a-z0-9-]` is dropped. The order matters:
/// ampersands must be expanded before the character filter runs or they would
/// simply vanish.
///
/// # Arguments
///
/// * `name` - The entity display name
///
/// # Returns
///
/// A lowercase, hyphenated string safe to use as `{slug}.json`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Apple"), "apple");
/// assert_eq!(slugify("Mahindra & Mahindra"), "mahindra-and-mahindra");
/// ```
pub fn slugify(name: &str) -> String {
    static NON_SLUG: OnceCell<Regex> = OnceCell::new();
    let non_slug = NON_SLUG.get_or_init(|| Regex::new(r"[^a-z0-9-]").unwrap());

    let lowered = name.to_lowercase().replace('&', "and").replace(' ', "-");
    non_slug.replace_all(&lowered, "").into_owned()
}

/// Truncate a title to `max` characters, appending `…` only when something
/// was actually cut.
///
/// Truncation counts characters, not bytes, so multi-byte titles are never
/// split mid-codepoint.
///
/// # Arguments
///
/// * `title` - The title to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// The original string if it fits, otherwise the first `max` characters with
/// a single ellipsis appended.
pub fn truncate_title(title: &str, max: usize) -> String {
    match title.char_indices().nth(max) {
        None => title.to_string(),
        Some((idx, _)) => format!("{}…", &title[..idx]),
    }
}

/// Parse a feed timestamp leniently into UTC.
///
/// Providers disagree about date formats: Google News publishes RFC 2822
/// (`Mon, 24 Aug 2026 14:05:00 GMT`), the GitHub API publishes RFC 3339
/// (`2026-08-24T14:05:00Z`), and smaller blog feeds publish whatever their
/// generator felt like. Formats are tried in descending order of likelihood;
/// an unrecognized string yields `None` rather than an error, because a
/// missing date must never cost us the item itself.
///
/// # Arguments
///
/// * `raw` - The timestamp string as it appeared in the feed
///
/// # Returns
///
/// The instant in UTC, or `None` if nothing matched.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive datetime without a zone: treat as UTC.
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    // Bare date: midnight UTC.
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Arguments
///
/// * `path` - The directory path to validate
///
/// # Returns
///
/// `Ok(())` if the directory exists and is writable, or the I/O error
/// describing the failure.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    // Small sync write using std fs (simpler error surface).
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
