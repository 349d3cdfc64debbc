//! Yahoo Finance chart adapter for share-price history.
//!
//! This module fetches a trailing week of daily closes from the public
//! `v8/finance/chart` endpoint. No credentials are involved; the endpoint is
//! the one the Yahoo Finance web page itself reads from.
//!
//! # URL Pattern
//!
//! `https://query1.finance.yahoo.com/v8/finance/chart/{ticker}?range=7d&interval=1d`
//!
//! The ticker is percent-encoded: symbols like `M&M.NS` (NSE-listed
//! Mahindra & Mahindra) carry characters that would otherwise split the URL.
//!
//! # Normalization
//!
//! The chart payload arrives as parallel arrays of timestamps and closes,
//! with `null` holes on non-trading days. Normalization zips them into
//! [`PricePoint`]s, drops the holes, sorts ascending by date, and collapses
//! duplicate dates, so consumers can index `history.last()` without looking
//! at the calendar.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::error::SourceError;
use crate::models::{PricePoint, QuoteSnapshot};
use crate::rate_limit::RateLimiter;
use crate::sources::QuoteSource;

/// Rate-limiter key for all quote fetches.
pub const PROVIDER_KEY: &str = "yahoo_finance";

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const RANGE: &str = "7d";
const INTERVAL: &str = "1d";

/// Quote adapter over the Yahoo Finance chart API.
pub struct YahooFinanceQuotes {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl YahooFinanceQuotes {
    pub fn new(http: reqwest::Client, limiter: Arc<RateLimiter>) -> Self {
        YahooFinanceQuotes { http, limiter }
    }

    fn chart_url(ticker: &str) -> String {
        format!(
            "{CHART_ENDPOINT}/{}?range={RANGE}&interval={INTERVAL}",
            urlencoding::encode(ticker)
        )
    }
}

impl QuoteSource for YahooFinanceQuotes {
    #[instrument(level = "info", skip_all, fields(%ticker))]
    async fn fetch_quote(&self, ticker: &str) -> QuoteSnapshot {
        self.limiter.acquire(PROVIDER_KEY).await;

        let resp = match self.http.get(Self::chart_url(ticker)).send().await {
            Ok(resp) => resp,
            Err(e) => return failed(ticker, SourceError::Transport(e).to_string()),
        };
        let status = resp.status();
        if !status.is_success() {
            warn!(ticker, status = status.as_u16(), "Quote fetch rejected");
            return failed(
                ticker,
                SourceError::Status {
                    status: status.as_u16(),
                }
                .to_string(),
            );
        }

        match resp.json::<ChartResponse>().await {
            Ok(body) => {
                let snapshot = snapshot_from_chart(ticker, body);
                if let QuoteSnapshot::Series { history, .. } = &snapshot {
                    info!(ticker, points = history.len(), "Fetched quote history");
                }
                snapshot
            }
            Err(e) => failed(ticker, SourceError::Parse(e.to_string()).to_string()),
        }
    }
}

fn failed(ticker: &str, error: String) -> QuoteSnapshot {
    QuoteSnapshot::Failed {
        ticker: ticker.to_string(),
        error,
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartFault>,
}

#[derive(Debug, Deserialize)]
struct ChartFault {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "longName")]
    long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<CloseSeries>,
}

#[derive(Debug, Deserialize)]
struct CloseSeries {
    close: Option<Vec<Option<f64>>>,
}

/// Turn one chart payload into a snapshot.
fn snapshot_from_chart(ticker: &str, body: ChartResponse) -> QuoteSnapshot {
    if let Some(fault) = body.chart.error {
        let message = fault
            .description
            .or(fault.code)
            .unwrap_or_else(|| "provider error".to_string());
        return failed(ticker, message);
    }
    let Some(series) = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
    else {
        return failed(ticker, "empty chart result".to_string());
    };

    let timestamps = series.timestamp.unwrap_or_default();
    let closes = series
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    let history: Vec<PricePoint> = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close?;
            let date = DateTime::<Utc>::from_timestamp(*ts, 0)?.date_naive();
            Some(PricePoint { date, close })
        })
        .sorted_by_key(|p| p.date)
        .unique_by(|p| p.date)
        .collect();

    let latest = history.last().copied();
    QuoteSnapshot::Series {
        ticker: ticker.to_string(),
        currency: series.meta.currency,
        latest,
        history,
        name: series.meta.short_name.or(series.meta.long_name),
    }
}
