//! The persisted feed: loading, merging and saving.
//!
//! # Submodules
//!
//! - [`store`]: Reads and writes the RSS document on disk
//! - [`merge`]: Appends newly discovered items, deduplicated by link
//!
//! A source pass is always `store::load` → [`crate::models::Feed::merge`] →
//! `store::save`, with the feed threaded through as a plain value.

pub mod merge;
pub mod store;
