//! Data models for tracked entities and their aggregated records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Entity`]: One tracked company, as configured in the YAML entity list
//! - [`NormalizedItem`]: The uniform shape every source adapter produces
//! - [`PricePoint`] / [`QuoteSnapshot`]: Share-price history for one ticker
//! - [`EntityRecord`]: The complete per-company result of one run
//! - [`RunIndex`] / [`IndexEntry`]: The roll-up index over all records
//!
//! The JSON field names are part of the artifact contract: the static frontend
//! reads `{slug}.json` and `companies.json` straight off disk, so renaming a
//! field here breaks consumers that never see this crate.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One tracked company, as configured.
///
/// Only `name` is required. Every optional field switches a source on:
/// a ticker enables the quote fetch, `blog_rss` the blog feed, and
/// `github_repo` (in `owner/repo` form) the commit fetch.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Entity {
    /// Display name, also the input to slug derivation.
    pub name: String,
    /// Exchange ticker, e.g. `"AAPL"` or `"M&M.NS"`.
    #[serde(default)]
    pub ticker: Option<String>,
    /// Direct RSS/Atom feed URL for the company blog.
    #[serde(default)]
    pub blog_rss: Option<String>,
    /// GitHub repository in `owner/repo` form.
    #[serde(default)]
    pub github_repo: Option<String>,
}

impl Entity {
    /// The ticker to quote, if one is configured and non-blank.
    ///
    /// A ticker of `""` or whitespace counts as absent, so sloppy YAML like
    /// `ticker: ""` skips the quote fetch instead of querying the provider
    /// with an empty symbol.
    pub fn quote_ticker(&self) -> Option<&str> {
        self.ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A single entry in the uniform shape every source adapter emits.
///
/// News results, product-launch hits, blog posts, and commits all normalize
/// into this struct, which is what makes the downstream record assembly and
/// HTML rendering source-agnostic.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NormalizedItem {
    /// Item headline. Commit titles are the first message line, truncated.
    pub title: String,
    /// Link to the item. Diagnostic rows use `"#"`.
    pub link: String,
    /// Provider-supplied summary or description, when one exists.
    pub summary: Option<String>,
    /// Publication instant in UTC, when the provider's date parsed.
    pub published: Option<DateTime<Utc>>,
    /// Short provenance label, e.g. the outlet name or `"github"`.
    pub source: Option<String>,
}

/// One daily closing price. `date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// The result of one quote fetch: either a usable price series or the
/// provider failure, never a partial mix of the two.
///
/// Serialized untagged, so a successful snapshot reads as a plain object with
/// `history`, and a failed one as `{"ticker": ..., "error": ...}` — the shape
/// the frontend already branches on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QuoteSnapshot {
    Series {
        ticker: String,
        /// Quote currency as reported by the provider, e.g. `"USD"`, `"INR"`.
        currency: Option<String>,
        /// Convenience copy of the last point in `history`.
        latest: Option<PricePoint>,
        /// Daily closes, ascending by date, one point per calendar date.
        history: Vec<PricePoint>,
        /// Company name as the quote provider knows it.
        name: Option<String>,
    },
    Failed {
        ticker: String,
        error: String,
    },
}

impl QuoteSnapshot {
    /// The failure message, if this snapshot is a failed fetch.
    pub fn error(&self) -> Option<&str> {
        match self {
            QuoteSnapshot::Series { .. } => None,
            QuoteSnapshot::Failed { error, .. } => Some(error),
        }
    }
}

/// The complete per-company result of one pipeline run.
///
/// This is the unit that gets written to `{slug}.json`. It always exists for
/// every configured entity, however badly the providers behaved: failures
/// shrink the item lists and fill `errors`, they never remove the record.
///
/// # Error map
///
/// `errors` maps a source key (`"news"`, `"product_launches"`, `"blog"`,
/// `"commits"`, `"stock"`, or `"timeout"` when the whole aggregation was cut
/// off) to a short human-readable reason. A `BTreeMap` keeps the key order
/// stable so successive runs diff cleanly.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntityRecord {
    pub name: String,
    /// URL- and filename-safe identifier derived from `name`.
    pub slug: String,
    pub ticker: Option<String>,
    /// When this record's aggregation started, UTC.
    pub fetched_at: DateTime<Utc>,
    /// General news coverage.
    pub news: Vec<NormalizedItem>,
    /// Product-launch coverage from the targeted search query.
    pub product_launches: Vec<NormalizedItem>,
    /// Blog posts; `None` when no blog feed is configured.
    pub blog: Option<Vec<NormalizedItem>>,
    /// Recent commits; `None` when no repository is configured.
    pub commits: Option<Vec<NormalizedItem>>,
    /// Share-price snapshot; `None` when no ticker is configured.
    pub stock: Option<QuoteSnapshot>,
    /// Per-source failure reasons. Empty on a fully clean run.
    pub errors: BTreeMap<String, String>,
}

/// The roll-up index over one run, written to `companies.json`.
///
/// Listed in configuration order, not completion order, so the rendered
/// page keeps the operator's intended ordering run after run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunIndex {
    pub generated_at: DateTime<Utc>,
    pub companies: Vec<IndexEntry>,
}

/// One line of the run index.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexEntry {
    pub name: String,
    pub slug: String,
    pub ticker: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<&EntityRecord> for IndexEntry {
    fn from(record: &EntityRecord) -> Self {
        IndexEntry {
            name: record.name.clone(),
            slug: record.slug.clone(),
            ticker: record.ticker.clone(),
            last_updated: record.fetched_at,
        }
    }
}
