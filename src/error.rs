//! Error types shared across the pipeline.
//!
//! There are two very different failure worlds here and they never mix:
//!
//! - [`SourceError`] — an upstream provider misbehaved. These are ordinary
//!   operating conditions for a batch fetcher and are carried **as data**
//!   inside the per-entity record (see `EntityRecord::errors`), so one flaky
//!   endpoint can never take down a run.
//! - [`ConfigError`] — the operator gave us something unusable. These abort
//!   the run before a single network call is made.

use std::path::PathBuf;

use thiserror::Error;

/// A failure talking to, or decoding the answer of, one upstream provider.
///
/// The `Display` strings end up verbatim in the per-entity error map and in
/// the HTML digest, so they are kept short and operator-readable.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// Network-level trouble: DNS, connect, TLS, or the per-request timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered 2xx but the body could not be decoded.
    #[error("unparseable response: {0}")]
    Parse(String),
}

/// A configuration problem that must stop the run before any fetching.
///
/// Unlike [`SourceError`] these are returned as hard `Err` values all the way
/// up to `main`, because running a pipeline against a broken entity list
/// would silently overwrite artifacts or skip companies.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An entity with a blank name cannot be slugged or reported on.
    #[error("entity #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate entity name {name:?}")]
    DuplicateName { name: String },

    /// The name contains no characters that survive slugging.
    #[error("entity name {name:?} produces an empty slug")]
    EmptySlug { name: String },

    /// Two entities would write the same `{slug}.json` artifact.
    #[error("entities {first:?} and {second:?} collide on slug {slug:?}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
}
