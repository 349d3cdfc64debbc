//! Run orchestration: bounded-concurrency aggregation over the entity list.
//!
//! The runner validates the configuration, aggregates every entity through a
//! fixed-width pool, and assembles the run index. Ordering is part of the
//! contract: records and index entries come back in configuration order no
//! matter which entity finished first.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{error, info, instrument, warn};

use crate::aggregator::EntityAggregator;
use crate::config;
use crate::error::ConfigError;
use crate::models::{Entity, EntityRecord, IndexEntry, RunIndex};
use crate::sources::{FeedSource, ItemSource, QuoteSource};
use crate::utils::slugify;

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Entities aggregated concurrently. Kept small so the aggregate
    /// outbound load stays polite even across entities.
    pub concurrency: usize,
    /// Budget for one entity's whole aggregation. An entity that exceeds it
    /// is abandoned and recorded as timed out; the run moves on.
    pub entity_deadline: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            concurrency: 4,
            entity_deadline: Duration::from_secs(45),
        }
    }
}

/// Drives one full run: validate, aggregate, index.
pub struct PipelineRunner<F, C, Q> {
    aggregator: EntityAggregator<F, C, Q>,
    config: PipelineConfig,
}

impl<F, C, Q> PipelineRunner<F, C, Q>
where
    F: FeedSource,
    C: ItemSource,
    Q: QuoteSource,
{
    pub fn new(aggregator: EntityAggregator<F, C, Q>, config: PipelineConfig) -> Self {
        PipelineRunner { aggregator, config }
    }

    /// Run the pipeline over `entities`.
    ///
    /// Configuration problems (empty names, duplicate slugs) abort before any
    /// fetch. Past that gate the run always completes: a timeout or panic in
    /// one entity degrades that entity's record only. Exactly one record per
    /// entity comes back, in configuration order, together with the index.
    #[instrument(level = "info", skip_all, fields(entities = entities.len()))]
    pub async fn run(&self, entities: &[Entity]) -> Result<(Vec<EntityRecord>, RunIndex), ConfigError> {
        config::validate(entities)?;
        info!(
            concurrency = self.config.concurrency,
            deadline = ?self.config.entity_deadline,
            "Pipeline run starting"
        );

        let records: Vec<EntityRecord> = stream::iter(entities)
            .map(|entity| self.aggregate_guarded(entity))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let index = RunIndex {
            generated_at: Utc::now(),
            companies: records.iter().map(IndexEntry::from).collect(),
        };
        let failed_sources: usize = records.iter().map(|r| r.errors.len()).sum();
        info!(
            records = records.len(),
            failed_sources, "Pipeline run finished"
        );
        Ok((records, index))
    }

    /// One entity's slot in the pool: a deadline and a panic barrier around
    /// the aggregation, so nothing an entity does can take the run down.
    async fn aggregate_guarded(&self, entity: &Entity) -> EntityRecord {
        let work = AssertUnwindSafe(self.aggregator.aggregate(entity)).catch_unwind();
        match tokio::time::timeout(self.config.entity_deadline, work).await {
            Ok(Ok(record)) => record,
            Ok(Err(_panic)) => {
                error!(entity = %entity.name, "Aggregation panicked; synthesizing record");
                fallback_record(entity, "pipeline", "aggregation failed unexpectedly")
            }
            Err(_elapsed) => {
                warn!(
                    entity = %entity.name,
                    deadline = ?self.config.entity_deadline,
                    "Entity exceeded deadline; abandoning"
                );
                fallback_record(
                    entity,
                    "timeout",
                    &format!(
                        "aggregation exceeded {:?} deadline",
                        self.config.entity_deadline
                    ),
                )
            }
        }
    }
}

/// Minimal record for an entity whose aggregation never produced one.
fn fallback_record(entity: &Entity, key: &str, message: &str) -> EntityRecord {
    let mut errors = BTreeMap::new();
    errors.insert(key.to_string(), message.to_string());
    EntityRecord {
        name: entity.name.clone(),
        slug: slugify(&entity.name),
        ticker: entity.ticker.clone(),
        fetched_at: Utc::now(),
        news: Vec::new(),
        product_launches: Vec::new(),
        blog: None,
        commits: None,
        stock: None,
        errors,
    }
}
