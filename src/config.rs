//! Source configuration.
//!
//! Sources are read from an optional YAML file listing each listing page and
//! the selector for its article blocks:
//!
//! ```yaml
//! sources:
//!   - url: https://blog.bitdrift.dev
//!     locator: article
//! ```
//!
//! Without a file the built-in [`default_sources`] are used.

use crate::errors::ConfigError;
use crate::models::Source;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<Source>,
}

/// The sources scraped when no sources file is given.
pub fn default_sources() -> Vec<Source> {
    vec![Source::new("https://blog.bitdrift.dev", "article")]
}

/// Resolve the list of sources to scrape.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML of the
/// expected shape, or lists no sources.
#[instrument(level = "info", skip_all)]
pub async fn load_sources(path: Option<&Path>) -> Result<Vec<Source>, ConfigError> {
    let Some(path) = path else {
        return Ok(default_sources());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let sources = parse_sources(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if sources.is_empty() {
        return Err(ConfigError::Empty);
    }
    info!(path = %path.display(), count = sources.len(), "Loaded sources file");
    Ok(sources)
}

fn parse_sources(content: &str) -> Result<Vec<Source>, serde_yaml::Error> {
    serde_yaml::from_str::<SourcesFile>(content).map(|file| file.sources)
}
