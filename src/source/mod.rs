//! Feed sources.
//!
//! A [`FeedSource`] produces the raw delimited text of the catalog feed.
//! The feed client owns caching and parsing; sources only fetch.
//!
//! - [`HttpFeedSource`]: the published spreadsheet export over HTTP(S)
//! - [`LocalFeedSource`]: a CSV export saved on disk
//! - [`MemoryFeedSource`]: scripted in-memory replies for tests and demos

pub mod http;
pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use http::HttpFeedSource;
pub use local::LocalFeedSource;
pub use memory::{MemoryFeedSource, Reply};

/// Trait for catalog feed backends.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the complete feed body as text.
    ///
    /// Transport failures and non-success responses are both errors.
    async fn fetch_text(&self) -> Result<String>;

    /// Where the feed comes from, for log messages.
    fn describe(&self) -> String;
}
