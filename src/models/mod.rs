// src/models/mod.rs

//! Domain models for the catalog feed.
//!
//! Configuration, the untyped feed [`Record`] and the typed [`Product`]
//! projection consumers build from it.

mod config;
mod product;
mod record;

// Re-export all public types
pub use config::{ColumnConfig, Config, FeedConfig, HttpConfig, LoggingConfig, SiteConfig};
pub use product::{Product, parse_price};
pub use record::{Record, normalize_field};
