//! JSON artifact generation for the static frontend.
//!
//! This module serializes per-entity records and the run index to the data
//! directory the frontend serves from.
//!
//! # Output Structure
//!
//! One file per entity plus the roll-up index:
//! ```text
//! data_dir/
//! ├── apple.json
//! ├── tata-motors.json
//! └── companies.json
//! ```
//!
//! Everything is pretty-printed. The artifacts live in version control
//! between runs, and an indented diff is reviewable where a one-line blob
//! is not.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, instrument};

use crate::models::{EntityRecord, RunIndex};

/// Filename of the run index artifact.
pub const INDEX_FILE: &str = "companies.json";

/// Write one entity record to `{data_dir}/{slug}.json`.
///
/// # Arguments
///
/// * `record` - The aggregated record to serialize
/// * `data_dir` - Base directory for JSON artifacts
///
/// # Returns
///
/// The path written, or the I/O error that stopped us.
#[instrument(level = "info", skip_all, fields(slug = %record.slug))]
pub async fn write_record(record: &EntityRecord, data_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(data_dir).await?;
    let path = data_dir.join(format!("{}.json", record.slug));
    let json = serde_json::to_string_pretty(record).map_err(io::Error::other)?;
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote entity record");
    Ok(path)
}

/// Write the run index to `{data_dir}/companies.json`.
#[instrument(level = "info", skip_all)]
pub async fn write_index(index: &RunIndex, data_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(data_dir).await?;
    let path = data_dir.join(INDEX_FILE);
    let json = serde_json::to_string_pretty(index).map_err(io::Error::other)?;
    fs::write(&path, json).await?;
    info!(path = %path.display(), companies = index.companies.len(), "Wrote run index");
    Ok(path)
}
