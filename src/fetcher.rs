//! Listing page retrieval with an optional exponential backoff retry layer.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the pipeline can be driven by a
//! real HTTP client or by an in-memory stand-in:
//! - [`Fetcher`]: Core trait, "given a URL, return the page body"
//! - [`HttpFetcher`]: `reqwest` implementation with a bounded request timeout
//! - [`RetryFetch`]: Decorator that adds retry logic to any `Fetcher`
//!
//! # Retry Strategy
//!
//! Retries are off by default; a single attempt per source is the normal
//! contract. When enabled:
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::errors::FetchError;
use rand::{rng, Rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Default request timeout for a listing page.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Trait for retrieving a page body by URL.
pub trait Fetcher {
    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    ///
    /// Implementations surface non-2xx responses as [`FetchError::Status`]
    /// and expired requests as [`FetchError::Timeout`].
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP fetcher backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let classify = |source: reqwest::Error| {
            if source.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    source,
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(classify)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Fetcher`].
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Maximum number of retry attempts after the first failure.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: Duration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: Fetcher,
{
    /// Create a new retry wrapper around an existing [`Fetcher`].
    ///
    /// With `max_retries == 0` the wrapper makes exactly one attempt.
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Fetcher for RetryFetch<T>
where
    T: Fetcher,
{
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_dt.as_millis() as u64,
                                error = %e,
                                "fetch exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let exponent = u32::try_from(attempt - 1).unwrap_or(u32::MAX).min(16);
                    let mut delay = self.base_delay.saturating_mul(1 << exponent);
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
