//! Command-line interface definitions for the blog RSS scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables.

use crate::fetcher::DEFAULT_TIMEOUT;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the blog RSS scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the built-in sources into ./feed.xml
/// blog_rss_scraper
///
/// # Custom feed location and source list
/// blog_rss_scraper --feed-file public/feed.xml --sources sources.yaml
///
/// # Slow sites: longer timeout and two retries per page
/// blog_rss_scraper --timeout-secs 60 --retries 2
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the RSS feed file to update
    #[arg(short, long, env = "FEED_FILE", default_value = "feed.xml")]
    pub feed_file: PathBuf,

    /// Optional YAML file listing the sources to scrape
    #[arg(short, long, env = "SOURCES_FILE")]
    pub sources: Option<PathBuf>,

    /// Per-request timeout in seconds when fetching a listing page
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Retries after a failed fetch, with exponential backoff
    #[arg(long, env = "FETCH_RETRIES", default_value_t = 0)]
    pub retries: usize,
}
