//! Upstream source adapters for fetching per-company signals.
//!
//! This module contains one submodule per upstream provider, plus the
//! capability traits the aggregator is written against. Every adapter
//! normalizes whatever the provider returns into [`NormalizedItem`]s, so
//! nothing downstream knows or cares which provider an item came from.
//!
//! # Supported Sources
//!
//! | Provider | Module | Feeds | Notes |
//! |----------|--------|-------|-------|
//! | Google News | [`google_news`] | news, product launches, blogs | RSS search endpoint plus direct feed URLs |
//! | GitHub | [`github`] | commits | REST API; optional token raises the rate limit |
//! | Yahoo Finance | [`yahoo`] | share prices | v8 chart API, 7-day daily window |
//!
//! # Common Patterns
//!
//! Adapters never return `Err`. Upstream trouble rides inside the returned
//! [`SourceBatch`] (or [`QuoteSnapshot::Failed`] for quotes) so that one
//! broken provider degrades one field of one record instead of failing the
//! run. Every network call first takes a slot from the shared
//! [`RateLimiter`](crate::rate_limit::RateLimiter) under the provider's key.

pub mod github;
pub mod google_news;
pub mod yahoo;

use crate::error::SourceError;
use crate::models::{NormalizedItem, QuoteSnapshot};

/// The outcome of one adapter call: the items the provider yielded plus the
/// failure, if any.
///
/// Both sides can be populated at once. The commit adapter answers a rejected
/// fetch with a visible diagnostic row *and* an error, so the record keeps a
/// trace of the section while the error map explains what went wrong.
#[derive(Debug)]
pub struct SourceBatch {
    pub items: Vec<NormalizedItem>,
    pub error: Option<SourceError>,
}

impl SourceBatch {
    /// A clean batch.
    pub fn ok(items: Vec<NormalizedItem>) -> Self {
        SourceBatch { items, error: None }
    }

    /// A failed batch with no items.
    pub fn failed(error: SourceError) -> Self {
        SourceBatch {
            items: Vec::new(),
            error: Some(error),
        }
    }
}

/// Uniform fetch capability: a query and an item budget in, normalized items
/// out.
///
/// `query` is provider-specific — a search string for feed providers, an
/// `owner/repo` identifier for the commit provider. Implementations never
/// fail at the type level; trouble is reported inside the batch.
pub trait ItemSource {
    async fn fetch_items(&self, query: &str, limit: usize) -> SourceBatch;
}

/// Syndication-feed capability: keyword search plus direct feed fetch.
pub trait FeedSource {
    /// Search the provider's feed-search endpoint for `query`.
    async fn search(&self, query: &str, limit: usize) -> SourceBatch;

    /// Fetch a known feed URL directly (company blogs).
    async fn fetch_feed(&self, feed_url: &str, limit: usize) -> SourceBatch;
}

/// Share-price history capability.
pub trait QuoteSource {
    async fn fetch_quote(&self, ticker: &str) -> QuoteSnapshot;
}
