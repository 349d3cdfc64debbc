//! # Company Tracker
//!
//! A company intelligence pipeline that pulls news coverage, product-launch
//! chatter, engineering activity, and stock quotes for a configured list of
//! companies, then publishes per-company JSON artifacts, a roll-up index,
//! and an optional HTML digest.
//!
//! ## Features
//!
//! - Searches Google News for recent coverage and product-launch stories
//! - Follows each company's blog RSS/Atom feed when one is configured
//! - Pulls recent commits from a configured GitHub repository
//! - Snapshots a week of daily closing prices from Yahoo Finance
//! - Writes one JSON file per company plus a `companies.json` run index
//! - Optionally renders a single-page HTML digest of the whole run
//!
//! ## Usage
//!
//! ```sh
//! company_tracker -c companies.yaml -d ./data --html-output ./data/digest.html
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Configuration**: Load and validate the company list (unique names and slugs)
//! 2. **Aggregation**: Fan each company out to its sources (parallel, 4 companies at a time)
//! 3. **Output**: Write per-company JSON, the run index, and the optional HTML digest

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregator;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod rate_limit;
mod retry;
mod sources;
mod utils;

use aggregator::EntityAggregator;
use cli::Cli;
use pipeline::{PipelineConfig, PipelineRunner};
use rate_limit::RateLimiter;
use retry::RetryFetch;
use sources::github::GithubCommits;
use sources::google_news::GoogleNewsFeed;
use sources::yahoo::YahooFinanceQuotes;
use utils::ensure_writable_dir;

/// Sent on every outbound request so providers can identify the client.
const USER_AGENT: &str = concat!("company_tracker/", env!("CARGO_PKG_VERSION"));

/// Hard cap on any single HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("company_tracker starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.data_dir, ?args.html_output, "Parsed CLI arguments");

    // Early check: ensure the data directory is writable before any network work
    if let Err(e) = ensure_writable_dir(&args.data_dir).await {
        error!(
            path = %args.data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Load company list ----
    let entities = config::load_entities(&args.config)?;
    info!(
        path = %args.config.display(),
        companies = entities.len(),
        "Loaded company list"
    );

    // ---- Wire up sources ----
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
        args.provider_spacing_ms,
    )));

    if args.github_token.is_some() {
        debug!("GitHub token present; commit requests will be authenticated");
    }

    let feeds = GoogleNewsFeed::new(http.clone(), Arc::clone(&limiter));
    let commits = RetryFetch::new(
        GithubCommits::new(http.clone(), Arc::clone(&limiter), args.github_token.clone()),
        args.retry_attempts,
        Duration::from_secs(1),
    );
    let quotes = YahooFinanceQuotes::new(http, limiter);

    let runner = PipelineRunner::new(
        EntityAggregator::new(feeds, commits, quotes),
        PipelineConfig {
            concurrency: args.concurrency,
            entity_deadline: Duration::from_secs(args.entity_deadline_secs),
        },
    );

    // ---- Aggregate all companies ----
    let (records, index) = runner.run(&entities).await?;

    let failed_sources: usize = records.iter().map(|r| r.errors.len()).sum();
    if failed_sources > 0 {
        warn!(
            companies = records.len(),
            failed_sources,
            "Aggregation finished with degraded sources"
        );
    } else {
        info!(companies = records.len(), "Aggregation finished cleanly");
    }

    // ---- JSON output ----
    let mut written = 0usize;
    for record in &records {
        match outputs::json::write_record(record, &args.data_dir).await {
            Ok(path) => {
                debug!(path = %path.display(), company = %record.name, "Wrote company record");
                written += 1;
            }
            Err(e) => {
                error!(company = %record.name, error = %e, "Failed writing company record");
            }
        }
    }
    if let Err(e) = outputs::json::write_index(&index, &args.data_dir).await {
        error!(error = %e, "Failed writing run index");
        return Err(e.into());
    }
    info!(written, total = records.len(), "JSON output complete");

    // ---- HTML digest (optional) ----
    if let Some(ref html_path) = args.html_output {
        if let Err(e) = outputs::html::write_digest(&index, &records, html_path).await {
            error!(path = %html_path.display(), error = %e, "Failed writing HTML digest");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
