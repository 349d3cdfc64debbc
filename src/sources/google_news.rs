//! Google News RSS search adapter, also used for direct blog feeds.
//!
//! This module talks to the [Google News](https://news.google.com) RSS search
//! endpoint for company news and product-launch coverage, and fetches
//! configured blog feed URLs directly. Both paths produce the same
//! [`NormalizedItem`] shape.
//!
//! # URL Pattern
//!
//! Searches hit `https://news.google.com/rss/search?q={query}` with the
//! `hl`/`gl`/`ceid` parameters pinned to the US-English edition, which is the
//! edition that returns stable, well-formed result feeds.

use std::sync::Arc;

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::SourceError;
use crate::models::NormalizedItem;
use crate::rate_limit::RateLimiter;
use crate::sources::{FeedSource, SourceBatch};
use crate::utils::parse_feed_date;

/// Rate-limiter key for the search endpoint.
pub const PROVIDER_KEY: &str = "google_news";

const SEARCH_ENDPOINT: &str = "https://news.google.com/rss/search";

/// Feed adapter over the Google News RSS search endpoint.
pub struct GoogleNewsFeed {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl GoogleNewsFeed {
    pub fn new(http: reqwest::Client, limiter: Arc<RateLimiter>) -> Self {
        GoogleNewsFeed { http, limiter }
    }

    fn search_url(query: &str) -> String {
        format!(
            "{SEARCH_ENDPOINT}?q={}&hl=en-US&gl=US&ceid=US:en",
            urlencoding::encode(query)
        )
    }

    async fn fetch_xml(&self, provider: &str, url: &str) -> Result<String, SourceError> {
        self.limiter.acquire(provider).await;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }

    async fn fetch_and_parse(&self, provider: &str, url: &str, limit: usize) -> SourceBatch {
        match self.fetch_xml(provider, url).await {
            Ok(xml) => match parse_feed(&xml, limit) {
                Ok(items) => {
                    info!(count = items.len(), "Fetched feed items");
                    SourceBatch::ok(items)
                }
                Err(e) => SourceBatch::failed(e),
            },
            Err(e) => SourceBatch::failed(e),
        }
    }
}

impl FeedSource for GoogleNewsFeed {
    #[instrument(level = "info", skip_all, fields(%query, limit))]
    async fn search(&self, query: &str, limit: usize) -> SourceBatch {
        let url = Self::search_url(query);
        self.fetch_and_parse(PROVIDER_KEY, &url, limit).await
    }

    #[instrument(level = "info", skip_all, fields(%feed_url, limit))]
    async fn fetch_feed(&self, feed_url: &str, limit: usize) -> SourceBatch {
        let key = feed_host_key(feed_url);
        self.fetch_and_parse(&key, feed_url, limit).await
    }
}

/// Compose the product-launch search query for an entity name.
///
/// The phrasing is deliberately broad; the search engine treats the quoted
/// and unquoted terms as alternatives and ranks announcement coverage first.
pub fn product_query(name: &str) -> String {
    format!(r#"{name} product launch OR launches OR "new product" OR "launches""#)
}

/// Rate-limiter key for a direct feed fetch: the feed's host, so every blog
/// gets its own schedule instead of queueing behind the search endpoint.
fn feed_host_key(feed_url: &str) -> String {
    Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "feed".to_string())
}

// ---------------------------------------------------------------------------
// Feed parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<FeedOrigin>,
}

/// `<source url="...">Outlet Name</source>` — we want the text, not the URL.
#[derive(Debug, Deserialize)]
struct FeedOrigin {
    #[serde(rename = "$text")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse feed XML into normalized items, applying the item budget.
///
/// RSS 2.0 is tried first (Google News and most blogs), then Atom (Blogger
/// and friends). Entries missing a title or link are skipped; a feed with
/// zero entries is a valid, empty result.
fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NormalizedItem>, SourceError> {
    let xml = scrub_named_entities(xml);
    let rss_err = match from_str::<Rss>(&xml) {
        Ok(rss) => return Ok(collect_rss_items(rss, limit)),
        Err(e) => e,
    };
    if let Ok(atom) = from_str::<AtomFeed>(&xml) {
        return Ok(collect_atom_items(atom, limit));
    }
    Err(SourceError::Parse(rss_err.to_string()))
}

fn collect_rss_items(rss: Rss, limit: usize) -> Vec<NormalizedItem> {
    let mut items = Vec::new();
    let mut skipped = 0usize;
    for entry in rss.channel.items {
        if items.len() == limit {
            break;
        }
        let (Some(title), Some(link)) = (entry.title, entry.link) else {
            skipped += 1;
            continue;
        };
        items.push(NormalizedItem {
            title,
            link,
            summary: entry.description,
            published: entry.pub_date.as_deref().and_then(parse_feed_date),
            source: entry.source.and_then(|s| s.name),
        });
    }
    if skipped > 0 {
        debug!(skipped, "Dropped feed entries missing title or link");
    }
    items
}

fn collect_atom_items(atom: AtomFeed, limit: usize) -> Vec<NormalizedItem> {
    let mut items = Vec::new();
    for entry in atom.entries {
        if items.len() == limit {
            break;
        }
        let Some(title) = entry.title else { continue };
        let Some(link) = pick_atom_link(&entry.links) else {
            continue;
        };
        let raw_date = entry.published.or(entry.updated);
        items.push(NormalizedItem {
            title,
            link,
            summary: entry.summary,
            published: raw_date.as_deref().and_then(parse_feed_date),
            source: None,
        });
    }
    items
}

/// Prefer the `rel="alternate"` link (or a link with no rel), fall back to
/// whatever came first.
fn pick_atom_link(links: &[AtomLink]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.href.clone())
}

/// Replace HTML-only named entities that are undefined in XML and would
/// otherwise abort the parse. Seen in the wild in smaller blog feeds.
fn scrub_named_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
