//! Article extraction from blog listing pages.
//!
//! A listing page repeats one block per article. The source's locator
//! selects those blocks; inside each block the first heading, anchor,
//! paragraph, image and `<time>` element supply the item fields.
//!
//! # Field Sources
//!
//! | Field | Element | Fallback |
//! |-------|---------|----------|
//! | title | first `h1`, else `h2`, else `h3` | empty |
//! | link | first `a`, its `href`, resolved | item skipped |
//! | description | first `p` | empty |
//! | media | first `img`, its `src`, resolved | no media |
//! | pubDate | first `time`, its `content` or `datetime` | extraction time |

use crate::errors::ScrapeError;
use crate::models::{Item, MediaContent};
use crate::scrapers::dom::DomNode;
use crate::utils::{format_pub_date, parse_pub_date, resolve_url, truncate_for_log};
use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, info, instrument, warn};

const HEADING_SELECTORS: [&str; 3] = ["h1", "h2", "h3"];

/// Extract items from a parsed page, dating undated articles "now".
///
/// See [`extract_items_at`].
pub fn extract_items<N: DomNode>(
    base_url: &str,
    root: &N,
    locator: &str,
) -> Result<Vec<Item>, ScrapeError> {
    extract_items_at(base_url, root, locator, Local::now().fixed_offset())
}

/// Extract one [`Item`] per block matching `locator`, in document order.
///
/// # Arguments
///
/// * `base_url` - URL of the listing page, used to resolve root-relative links
/// * `root` - The parsed page
/// * `locator` - CSS selector matching each article block
/// * `now` - Publication time for blocks without a parseable `<time>`
///
/// # Returns
///
/// The fully materialized list of items. Blocks whose link is missing or
/// cannot be resolved are logged and left out.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidSelector`] if `locator` is not a valid
/// CSS selector.
#[instrument(level = "info", skip_all, fields(%base_url, %locator))]
pub fn extract_items_at<N: DomNode>(
    base_url: &str,
    root: &N,
    locator: &str,
    now: DateTime<FixedOffset>,
) -> Result<Vec<Item>, ScrapeError> {
    let blocks = root.find_all(locator)?;
    let mut items = Vec::with_capacity(blocks.len());

    for (index, block) in blocks.iter().enumerate() {
        if let Some(item) = extract_item(base_url, block, now)? {
            debug!(index, link = %item.link, title = %truncate_for_log(&item.title, 80), "Extracted article");
            items.push(item);
        }
    }

    info!(
        blocks = blocks.len(),
        count = items.len(),
        "Extracted articles from listing page"
    );
    Ok(items)
}

fn extract_item<N: DomNode>(
    base_url: &str,
    block: &N,
    now: DateTime<FixedOffset>,
) -> Result<Option<Item>, ScrapeError> {
    let Some(href) = first_attribute(block, "a", "href")? else {
        warn!(%base_url, "Article block has no link; skipping");
        return Ok(None);
    };
    let link = match resolve_url(base_url, &href) {
        Ok(link) => link,
        Err(e) => {
            warn!(%base_url, %href, error = %e, "Failed to resolve article link; skipping");
            return Ok(None);
        }
    };

    let title = heading_text(block)?;
    let description = first_text(block, "p")?;

    let media = first_attribute(block, "img", "src")?
        .and_then(|src| match resolve_url(base_url, &src) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(%src, error = %e, "Failed to resolve cover image; ignoring");
                None
            }
        })
        .filter(|url| !url.is_empty())
        .map(MediaContent::image);

    let published = publication_date(block)?.unwrap_or(now);

    Ok(Some(Item {
        title,
        link,
        description,
        pub_date: format_pub_date(&published),
        media,
    }))
}

fn heading_text<N: DomNode>(block: &N) -> Result<String, ScrapeError> {
    for selector in HEADING_SELECTORS {
        if let Some(heading) = block.find_first(selector)? {
            return Ok(heading.text().trim().to_string());
        }
    }
    Ok(String::new())
}

fn first_text<N: DomNode>(block: &N, selector: &str) -> Result<String, ScrapeError> {
    Ok(block
        .find_first(selector)?
        .map(|node| node.text().trim().to_string())
        .unwrap_or_default())
}

fn first_attribute<N: DomNode>(
    block: &N,
    selector: &str,
    name: &str,
) -> Result<Option<String>, ScrapeError> {
    Ok(block
        .find_first(selector)?
        .and_then(|node| node.attribute(name)))
}

fn publication_date<N: DomNode>(block: &N) -> Result<Option<DateTime<FixedOffset>>, ScrapeError> {
    let Some(time) = block.find_first("time")? else {
        return Ok(None);
    };
    let parsed = ["content", "datetime"]
        .into_iter()
        .filter_map(|name| time.attribute(name))
        .find_map(|value| parse_pub_date(&value));
    Ok(parsed)
}
