//! Per-entity fan-out and record assembly.
//!
//! The aggregator owns one instance of each source capability and, for one
//! entity at a time, runs every applicable fetch concurrently and folds the
//! partial results into a single [`EntityRecord`]. It is deliberately
//! infallible: upstream trouble shrinks a field and lands in the record's
//! error map, it never propagates as an `Err`.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::models::{Entity, EntityRecord, NormalizedItem, QuoteSnapshot};
use crate::sources::google_news::product_query;
use crate::sources::{FeedSource, ItemSource, QuoteSource, SourceBatch};
use crate::utils::slugify;

/// Per-source item budgets.
///
/// The defaults match the production artifact sizes: enough to fill a digest
/// section, small enough that a record stays a quick read.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub news: usize,
    pub product_launches: usize,
    pub blog: usize,
    pub commits: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        FetchLimits {
            news: 8,
            product_launches: 5,
            blog: 3,
            commits: 3,
        }
    }
}

/// Fans one entity out to the configured sources and assembles the record.
///
/// Generic over the three capabilities so tests can drop in
/// deterministic fakes without any network.
pub struct EntityAggregator<F, C, Q> {
    feeds: F,
    commits: C,
    quotes: Q,
    limits: FetchLimits,
}

impl<F, C, Q> EntityAggregator<F, C, Q>
where
    F: FeedSource,
    C: ItemSource,
    Q: QuoteSource,
{
    pub fn new(feeds: F, commits: C, quotes: Q) -> Self {
        EntityAggregator {
            feeds,
            commits,
            quotes,
            limits: FetchLimits::default(),
        }
    }

    /// Aggregate one entity into its record.
    ///
    /// News and product-launch searches always run. The blog, commit, and
    /// quote fetches run only when the entity configures them; unconfigured
    /// sources yield `None` fields, not errors. All sub-fetches run
    /// concurrently and each failure degrades its own field only.
    #[instrument(level = "info", skip_all, fields(entity = %entity.name))]
    pub async fn aggregate(&self, entity: &Entity) -> EntityRecord {
        let fetched_at = Utc::now();

        let product_q = product_query(&entity.name);
        let news_fut = self.feeds.search(&entity.name, self.limits.news);
        let products_fut = self.feeds.search(&product_q, self.limits.product_launches);
        let blog_fut = async {
            match &entity.blog_rss {
                Some(url) => Some(self.feeds.fetch_feed(url, self.limits.blog).await),
                None => None,
            }
        };
        let commits_fut = async {
            match &entity.github_repo {
                Some(repo) => Some(self.commits.fetch_items(repo, self.limits.commits).await),
                None => None,
            }
        };
        let quote_fut = async {
            match entity.quote_ticker() {
                Some(ticker) => Some(self.quotes.fetch_quote(ticker).await),
                None => None,
            }
        };

        let (news, product_launches, blog, commits, stock) =
            tokio::join!(news_fut, products_fut, blog_fut, commits_fut, quote_fut);

        let mut errors = BTreeMap::new();
        let news = take_items("news", news, &mut errors);
        let product_launches = take_items("product_launches", product_launches, &mut errors);
        let blog = blog.map(|batch| take_items("blog", batch, &mut errors));
        let commits = commits.map(|batch| take_items("commits", batch, &mut errors));
        if let Some(message) = stock.as_ref().and_then(QuoteSnapshot::error) {
            errors.insert("stock".to_string(), message.to_string());
        }

        if errors.is_empty() {
            info!(
                news = news.len(),
                products = product_launches.len(),
                "Aggregated entity"
            );
        } else {
            warn!(
                news = news.len(),
                products = product_launches.len(),
                failed_sources = errors.len(),
                "Aggregated entity with source failures"
            );
        }

        EntityRecord {
            name: entity.name.clone(),
            slug: slugify(&entity.name),
            ticker: entity.ticker.clone(),
            fetched_at,
            news,
            product_launches,
            blog,
            commits,
            stock,
            errors,
        }
    }
}

/// Unpack a batch: items go into the record, the error (if any) goes into the
/// map under the record field's name.
fn take_items(
    source: &str,
    batch: SourceBatch,
    errors: &mut BTreeMap<String, String>,
) -> Vec<NormalizedItem> {
    if let Some(err) = batch.error {
        errors.insert(source.to_string(), err.to_string());
    }
    batch.items
}
