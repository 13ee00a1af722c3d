//! Error types for every stage of the scrape-and-merge pipeline.
//!
//! Each stage owns a small enum; [`SourceError`] wraps them at the
//! orchestrator boundary so a run can decide, per error kind, whether to
//! skip a source or stop entirely.

use std::path::PathBuf;
use thiserror::Error;

/// Failure resolving a root-relative URL against a page URL.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The page URL used as the resolution base could not be parsed.
    #[error("invalid base URL {base:?}: {source}")]
    InvalidBaseUrl {
        base: String,
        #[source]
        source: url::ParseError,
    },

    /// The candidate could not be resolved as a URL reference.
    #[error("invalid relative URL {candidate:?}: {source}")]
    InvalidRelativeUrl {
        candidate: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure fetching a listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure (DNS, connect, body read).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request did not finish within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Failure reading, parsing or writing the persisted feed file.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read feed file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feed file {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("failed to write feed file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure querying a fetched page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Failure loading the sources configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read sources file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no sources configured")]
    Empty,
}

/// Everything that can go wrong while processing one source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The feed could not be loaded. Fatal when it happens for the first source.
    #[error(transparent)]
    Load(FeedError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// The merged feed could not be persisted.
    #[error(transparent)]
    Save(FeedError),
}
