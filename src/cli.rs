//! Command-line interface definitions for the company tracker.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials can be provided via environment variables instead of flags.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the company tracker pipeline.
///
/// This struct defines all configuration options that can be passed to the
/// application at runtime. Options include the entity list, output locations,
/// pacing, and the per-entity deadline.
///
/// # Examples
///
/// ```sh
/// # Basic usage with the defaults (companies.yaml -> ./data)
/// company_tracker
///
/// # Explicit config and output locations, plus the HTML digest
/// company_tracker -c companies.yaml -d ./data --html-output ./index.html
///
/// # Authenticated commit fetches and a couple of retries for flaky evenings
/// GITHUB_TOKEN=ghp_xxx company_tracker --retry-attempts 2
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML entity list
    #[arg(short, long, default_value = "companies.yaml")]
    pub config: PathBuf,

    /// Output directory for the per-entity JSON artifacts and run index
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Optional path for the static HTML digest (skipped when absent)
    #[arg(long)]
    pub html_output: Option<PathBuf>,

    /// GitHub API token for authenticated commit fetches
    #[arg(long, env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Entities aggregated concurrently
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Per-entity aggregation deadline in seconds
    #[arg(long, default_value_t = 45)]
    pub entity_deadline_secs: u64,

    /// Minimum spacing between calls to one provider, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub provider_spacing_ms: u64,

    /// Retry attempts for commit fetches (0 disables retrying)
    #[arg(long, default_value_t = 0)]
    pub retry_attempts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["company_tracker"]);

        assert_eq!(cli.config, PathBuf::from("companies.yaml"));
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.html_output, None);
        assert_eq!(cli.concurrency, 4);
        assert_eq!(cli.entity_deadline_secs, 45);
        assert_eq!(cli.provider_spacing_ms, 500);
        assert_eq!(cli.retry_attempts, 0);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "company_tracker",
            "--config",
            "./companies.yaml",
            "--data-dir",
            "./out",
            "--html-output",
            "./index.html",
            "--concurrency",
            "2",
        ]);

        assert_eq!(cli.config, PathBuf::from("./companies.yaml"));
        assert_eq!(cli.data_dir, PathBuf::from("./out"));
        assert_eq!(cli.html_output, Some(PathBuf::from("./index.html")));
        assert_eq!(cli.concurrency, 2);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["company_tracker", "-c", "/tmp/list.yaml", "-d", "/tmp/data"]);

        assert_eq!(cli.config, PathBuf::from("/tmp/list.yaml"));
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/data"));
    }
}
