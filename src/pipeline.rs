//! Per-source orchestration: load → fetch → extract → merge → save.
//!
//! Sources are processed one after another. Each pass reloads the feed from
//! disk, so a later failure never loses items already persisted for an
//! earlier source. Failures are collected as one [`SourceOutcome`] per
//! source. Only a failed load for the first source stops the run: at that
//! point nothing has been written, and saving a rebuilt feed could overwrite
//! one that merely failed to parse. Later load failures skip their source.

use crate::errors::SourceError;
use crate::feed::store;
use crate::fetcher::Fetcher;
use crate::models::{Item, Source};
use crate::scrapers::articles::extract_items;
use crate::scrapers::dom::Page;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// The result of processing one source.
#[derive(Debug)]
pub struct SourceOutcome {
    /// The source's listing page URL.
    pub url: String,
    /// Number of newly appended items, or why the source was skipped.
    pub result: Result<usize, SourceError>,
}

/// Outcomes for every source attempted during a run, in order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    /// The error that stopped the run, if any.
    pub fn fatal(&self) -> Option<&SourceError> {
        match self.outcomes.first().map(|o| &o.result) {
            Some(Err(e @ SourceError::Load(_))) => Some(e),
            _ => None,
        }
    }

    /// Total number of items appended across all sources.
    pub fn added(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    /// URLs of the sources that failed, in run order.
    pub fn failed_urls(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.url.as_str())
            .collect()
    }

    /// Number of sources that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Drives sources through the scrape-and-merge cycle against one feed file.
#[derive(Debug)]
pub struct Pipeline<F> {
    fetcher: F,
    feed_path: PathBuf,
}

impl<F: Fetcher> Pipeline<F> {
    pub fn new(fetcher: F, feed_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            feed_path: feed_path.into(),
        }
    }

    pub fn feed_path(&self) -> &Path {
        &self.feed_path
    }

    /// Process every source in order.
    ///
    /// Failures are logged and recorded. A load failure on the first source
    /// ends the run without touching the remaining sources; any other failure
    /// skips just its source.
    #[instrument(level = "info", skip_all, fields(feed = %self.feed_path.display(), sources = sources.len()))]
    pub async fn run(&self, sources: &[Source]) -> RunReport {
        let mut report = RunReport::default();

        for (index, source) in sources.iter().enumerate() {
            let result = self.process_source(source).await;
            let fatal = match &result {
                Ok(added) => {
                    info!(url = %source.url, added, "Source processed");
                    false
                }
                Err(e @ SourceError::Load(_)) if index == 0 => {
                    error!(url = %source.url, path = %self.feed_path.display(), error = %e, "Cannot load feed; stopping");
                    true
                }
                Err(e) => {
                    warn!(url = %source.url, path = %self.feed_path.display(), error = %e, "Source failed; skipping");
                    false
                }
            };

            report.outcomes.push(SourceOutcome {
                url: source.url.clone(),
                result,
            });
            if fatal {
                break;
            }
        }

        info!(
            attempted = report.outcomes.len(),
            failed = report.failed(),
            added = report.added(),
            "Run complete"
        );
        report
    }

    /// Run one load → fetch → extract → merge → save cycle.
    #[instrument(level = "info", skip_all, fields(url = %source.url, locator = %source.locator))]
    pub async fn process_source(&self, source: &Source) -> Result<usize, SourceError> {
        let mut feed = store::load(&self.feed_path)
            .await
            .map_err(SourceError::Load)?;

        let body = self.fetcher.fetch(&source.url).await?;
        let items = scrape(source, &body)?;

        let added = feed.merge(items);
        store::save(&self.feed_path, &feed)
            .await
            .map_err(SourceError::Save)?;
        Ok(added)
    }
}

// Kept synchronous so the parsed document never lives across an await.
fn scrape(source: &Source, body: &str) -> Result<Vec<Item>, SourceError> {
    let page = Page::parse(body);
    Ok(extract_items(&source.url, &page.root(), &source.locator)?)
}
