//! Listing page parsing and article extraction.
//!
//! # Submodules
//!
//! - [`dom`]: The [`dom::DomNode`] query interface and its `scraper` implementation
//! - [`articles`]: Turns the blocks matched by a source's locator into feed items
//!
//! Extraction is synchronous and works on a fully fetched body; pages are
//! parsed only after the network round trip has completed.

pub mod articles;
pub mod dom;
