//! Data models for the persisted feed and the sources that feed it.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Feed`]: The RSS 2.0 document persisted to disk between runs
//! - [`Channel`]: Channel metadata plus the ordered item history
//! - [`Item`]: One scraped article entry
//! - [`MediaContent`]: An optional Media-RSS cover image reference
//! - [`Source`]: A configured (listing page URL, locator) pair
//!
//! Item order inside a [`Channel`] is significant: it records the order in
//! which articles were first discovered across runs.

use serde::Deserialize;

/// RSS version attribute written on the `<rss>` root element.
pub const RSS_VERSION: &str = "2.0";

/// Media-RSS namespace URI bound to the `media` prefix.
pub const MEDIA_NAMESPACE: &str = "http://search.yahoo.com/mrss/";

/// The only medium kind produced by the extractor.
pub const MEDIUM_IMAGE: &str = "image";

/// Channel title used when a feed is synthesized from scratch.
pub const CHANNEL_TITLE: &str = "Web Scraper Feed";

/// Channel description used when a feed is synthesized from scratch.
pub const CHANNEL_DESCRIPTION: &str = "Automatically generated RSS feed";

/// Canonical channel link used when a feed is synthesized from scratch.
pub const CHANNEL_LINK: &str = "https://fshchudlo.github.io/blog-to-rss-parser/feed.xml";

/// The persisted RSS document.
///
/// A `Feed` is loaded once per source pass, mutated in place by
/// [`Feed::merge`], and written back by the feed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// The `version` attribute of the `<rss>` element. Always `"2.0"`.
    pub version: String,
    /// The `xmlns:media` namespace declaration. Never blank on save.
    pub xmlns_media: String,
    /// The single `<channel>` element.
    pub channel: Channel,
}

impl Feed {
    /// Build an empty feed with the canonical version, namespace and
    /// channel constants.
    pub fn new() -> Self {
        Self {
            version: RSS_VERSION.to_string(),
            xmlns_media: MEDIA_NAMESPACE.to_string(),
            channel: Channel {
                title: CHANNEL_TITLE.to_string(),
                link: CHANNEL_LINK.to_string(),
                description: CHANNEL_DESCRIPTION.to_string(),
                items: Vec::new(),
            },
        }
    }

    /// Merge freshly extracted items into this feed's channel.
    ///
    /// Only items whose link has not been seen before are appended; see
    /// [`crate::feed::merge::merge_items`].
    ///
    /// # Returns
    ///
    /// The number of items that were appended.
    pub fn merge(&mut self, new_items: Vec<Item>) -> usize {
        let before = self.channel.items.len();
        let existing = std::mem::take(&mut self.channel.items);
        self.channel.items = crate::feed::merge::merge_items(existing, new_items);
        self.channel.items.len() - before
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

/// The `<channel>` element of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Items in first-discovery order.
    pub items: Vec<Item>,
}

/// A single article entry.
///
/// The `link` is the identity key: two items with the same link are the
/// same article, whatever their titles say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Trimmed headline text.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Trimmed summary text.
    pub description: String,
    /// Publication timestamp rendered as `Mon, 02 Jan 2006 15:04:05 -0700`.
    pub pub_date: String,
    /// Optional cover image.
    pub media: Option<MediaContent>,
}

/// A `<media:content>` reference attached to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContent {
    /// Absolute URL of the media resource.
    pub url: String,
    /// Medium kind. The extractor only ever produces [`MEDIUM_IMAGE`].
    pub medium: String,
}

impl MediaContent {
    /// Build an image reference for the given absolute URL.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            medium: MEDIUM_IMAGE.to_string(),
        }
    }
}

/// One configured site to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    /// Listing page URL, also used as the base for relative links.
    pub url: String,
    /// CSS selector matching each repeated article block on the page.
    pub locator: String,
}

impl Source {
    pub fn new(url: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            locator: locator.into(),
        }
    }
}
