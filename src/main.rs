//! # Blog RSS Scraper
//!
//! Scrapes blog listing pages that publish no feed of their own and keeps an
//! RSS 2.0 / Media-RSS feed file up to date with the articles they list.
//!
//! ## Features
//!
//! - Extracts title, link, summary, cover image and publication date from
//!   each article block matched by a per-site CSS selector
//! - Resolves root-relative links and images against the listing page
//! - Appends only articles whose link is not already in the feed, so
//!   re-running is safe
//! - Isolates failures per site: one unreachable blog never blocks the rest
//!
//! ## Usage
//!
//! ```sh
//! blog_rss_scraper --feed-file feed.xml --sources sources.yaml
//! ```
//!
//! ## Architecture
//!
//! For each configured source, in order:
//! 1. **Load**: Read the feed file, or start a new feed if it does not exist
//! 2. **Fetch**: Download the listing page
//! 3. **Extract**: Turn each matching article block into a feed item
//! 4. **Merge**: Append items with unseen links
//! 5. **Save**: Rewrite the feed file
//!
//! An unreadable or corrupt feed file at the start of the run aborts it
//! with a failure status rather than being replaced.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod errors;
mod feed;
mod fetcher;
mod models;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use fetcher::{HttpFetcher, RetryFetch};
use pipeline::Pipeline;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("blog_rss_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let sources = config::load_sources(args.sources.as_deref()).await?;
    info!(count = sources.len(), "Sources configured");

    let http = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
    let fetcher = RetryFetch::new(http, args.retries, Duration::from_secs(1));
    let pipeline = Pipeline::new(fetcher, &args.feed_file);

    let report = pipeline.run(&sources).await;

    let elapsed = start_time.elapsed();
    if let Some(fatal) = report.fatal() {
        error!(
            path = %pipeline.feed_path().display(),
            error = %fatal,
            "Aborting: existing feed could not be loaded"
        );
        return Err(fatal.to_string().into());
    }

    info!(
        ?elapsed,
        sources = sources.len(),
        failed = report.failed(),
        failed_sources = ?report.failed_urls(),
        added = report.added(),
        "Execution complete"
    );
    Ok(())
}
