//! Queryable DOM abstraction over fetched listing pages.
//!
//! The extractor only needs four capabilities from a parsed page: find the
//! first descendant matching a selector, find all of them, read an
//! attribute, and read the text content. [`DomNode`] captures exactly that,
//! and [`HtmlNode`] implements it on top of the `scraper` crate.

use crate::errors::ScrapeError;
use scraper::{ElementRef, Html, Selector};

/// A node in a parsed document that can be queried with CSS selectors.
pub trait DomNode: Sized {
    /// First descendant matching `selector`, in document order.
    fn find_first(&self, selector: &str) -> Result<Option<Self>, ScrapeError>;

    /// All descendants matching `selector`, in document order.
    fn find_all(&self, selector: &str) -> Result<Vec<Self>, ScrapeError>;

    /// Value of the named attribute, if present.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Concatenated text of this node and all its descendants.
    fn text(&self) -> String;
}

/// A fetched page parsed into an HTML document.
pub struct Page {
    html: Html,
}

impl Page {
    /// Parse an HTML response body. Parsing is lenient and never fails.
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// The document's root element.
    pub fn root(&self) -> HtmlNode<'_> {
        HtmlNode(self.html.root_element())
    }
}

/// An element of a [`Page`].
#[derive(Debug, Clone, Copy)]
pub struct HtmlNode<'a>(ElementRef<'a>);

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl<'a> DomNode for HtmlNode<'a> {
    fn find_first(&self, selector: &str) -> Result<Option<Self>, ScrapeError> {
        let selector = parse_selector(selector)?;
        Ok(self.0.select(&selector).next().map(HtmlNode))
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Self>, ScrapeError> {
        let selector = parse_selector(selector)?;
        Ok(self.0.select(&selector).map(HtmlNode).collect())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }

    fn text(&self) -> String {
        self.0.text().collect()
    }
}
