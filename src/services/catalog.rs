// src/services/catalog.rs

//! Product catalog service.
//!
//! Typed, consumer-facing queries over the feed client: listing, lookup by
//! style code or scanned QR payload, category browsing and the admin label
//! filter.

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::models::{ColumnConfig, Product};
use crate::services::FeedClient;
use crate::utils::url::resolve_scanned;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub products: usize,
    pub categories: usize,
}

/// Service for querying products from the feed.
pub struct Catalog {
    feed: Arc<FeedClient>,
    columns: ColumnConfig,
}

impl Catalog {
    /// Products take their style code from the feed's key field, whatever
    /// `columns.style_code` says.
    pub fn new(feed: Arc<FeedClient>, mut columns: ColumnConfig) -> Self {
        columns.style_code = feed.key_field().to_string();
        Self { feed, columns }
    }

    /// The underlying feed client.
    pub fn feed(&self) -> &FeedClient {
        &self.feed
    }

    /// All products in feed order.
    pub async fn products(&self) -> Result<Vec<Product>> {
        let records = self.feed.fetch_all().await?;
        Ok(records
            .iter()
            .map(|record| Product::from_record(record, &self.columns))
            .collect())
    }

    /// Look up a product by style code.
    pub async fn product(&self, style_code: &str) -> Result<Option<Product>> {
        let record = self.feed.fetch_by_key(style_code).await?;
        Ok(record.map(|record| Product::from_record(&record, &self.columns)))
    }

    /// Look up the product a scanned QR payload points at.
    pub async fn scan(&self, payload: &str) -> Result<Option<Product>> {
        match resolve_scanned(payload) {
            Some(code) => self.product(&code).await,
            None => Ok(None),
        }
    }

    /// Products in a category, compared case-insensitively.
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>> {
        let wanted = category.trim().to_lowercase();
        Ok(self
            .products()
            .await?
            .into_iter()
            .filter(|product| product.category.to_lowercase() == wanted)
            .collect())
    }

    /// Distinct categories in first-seen order.
    pub async fn categories(&self) -> Result<Vec<String>> {
        self.feed.distinct_values(&self.columns.category).await
    }

    /// Products whose style code contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    pub async fn filter_codes(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.trim().to_lowercase();
        Ok(self
            .products()
            .await?
            .into_iter()
            .filter(|product| product.style_code.to_lowercase().contains(&query))
            .collect())
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            products: self.feed.fetch_all().await?.len(),
            categories: self.categories().await?.len(),
        })
    }
}
