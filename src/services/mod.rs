//! Service layer for the catalog feed.
//!
//! This module contains the business logic for:
//! - Cached feed access with stale fallback (`FeedClient`)
//! - Typed product queries (`Catalog`)

mod catalog;
mod feed;

pub use catalog::{Catalog, CatalogStats};
pub use feed::{CacheSnapshot, FeedClient};
