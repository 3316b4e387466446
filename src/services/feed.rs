// src/services/feed.rs

//! Cached catalog feed client.
//!
//! Holds a single cache slot with the last successfully parsed feed. A fresh
//! slot is served without touching the source; an expired or empty slot
//! triggers one fetch. When that fetch fails, whatever the slot holds is
//! served regardless of age, and only a cold failure reaches the caller.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::{Config, Record, normalize_field};
use crate::parser::{FeedDiagnostics, parse_feed};
use crate::source::{FeedSource, HttpFeedSource};

/// The single cache slot.
#[derive(Debug)]
struct CacheEntry {
    records: Arc<Vec<Record>>,
    fetched: Instant,
    fetched_at: DateTime<Utc>,
    diagnostics: FeedDiagnostics,
}

/// Read-only view of the cache slot.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    /// Wall-clock time of the last successful fetch
    pub fetched_at: DateTime<Utc>,
    /// Time since the last successful fetch
    pub age: Duration,
    /// Whether the slot is still inside the freshness window
    pub fresh: bool,
    pub record_count: usize,
    pub diagnostics: FeedDiagnostics,
}

/// Catalog feed client with a freshness window and stale fallback.
pub struct FeedClient {
    source: Arc<dyn FeedSource>,
    key_field: String,
    freshness: Duration,
    cache: RwLock<Option<CacheEntry>>,
}

impl FeedClient {
    /// Create a client over any feed source.
    pub fn new(source: Arc<dyn FeedSource>, key_field: &str, freshness: Duration) -> Self {
        Self {
            source,
            key_field: normalize_field(key_field),
            freshness,
            cache: RwLock::new(None),
        }
    }

    /// Create a client for the published sheet named in the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = HttpFeedSource::from_config(config)?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Create a client using the configured key field and freshness window.
    pub fn with_source(config: &Config, source: Arc<dyn FeedSource>) -> Self {
        Self::new(source, &config.feed.key_field, config.feed.freshness())
    }

    /// Normalized name of the key field.
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Where the feed is fetched from.
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Return all records, fetching only when the cache is empty or expired.
    pub async fn fetch_all(&self) -> Result<Arc<Vec<Record>>> {
        if let Some(records) = self.fresh_records().await {
            log::debug!("Serving {} cached feed records", records.len());
            return Ok(records);
        }

        match self.refresh().await {
            Ok(records) => Ok(records),
            Err(error) => match self.cache.read().await.as_ref() {
                Some(entry) => {
                    log::warn!(
                        "Feed fetch from {} failed: {}. Serving {} stale records from {}",
                        self.source.describe(),
                        error,
                        entry.records.len(),
                        entry.fetched_at.to_rfc3339()
                    );
                    Ok(Arc::clone(&entry.records))
                }
                None => {
                    log::error!(
                        "Feed fetch from {} failed with no cached data: {}",
                        self.source.describe(),
                        error
                    );
                    Err(error)
                }
            },
        }
    }

    /// Find the first record whose key matches, ignoring case and surrounding whitespace.
    pub async fn fetch_by_key(&self, key: &str) -> Result<Option<Record>> {
        let records = self.fetch_all().await?;
        let needle = key.trim().to_lowercase();

        Ok(records
            .iter()
            .find(|record| record.value(&self.key_field).trim().to_lowercase() == needle)
            .cloned())
    }

    /// Distinct non-blank values of a field, in first-seen order.
    pub async fn distinct_values(&self, field: &str) -> Result<Vec<String>> {
        let records = self.fetch_all().await?;
        let field = normalize_field(field);

        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for record in records.iter() {
            let value = record.value(&field);
            if !value.trim().is_empty() && seen.insert(value) {
                values.push(value.to_string());
            }
        }
        Ok(values)
    }

    /// Drop the cache slot so the next call fetches.
    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
        log::debug!("Feed cache cleared");
    }

    /// Inspect the cache slot without fetching.
    pub async fn snapshot(&self) -> Option<CacheSnapshot> {
        self.cache.read().await.as_ref().map(|entry| {
            let age = entry.fetched.elapsed();
            CacheSnapshot {
                fetched_at: entry.fetched_at,
                age,
                fresh: age < self.freshness,
                record_count: entry.records.len(),
                diagnostics: entry.diagnostics.clone(),
            }
        })
    }

    async fn fresh_records(&self) -> Option<Arc<Vec<Record>>> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.fetched.elapsed() < self.freshness)
            .map(|entry| Arc::clone(&entry.records))
    }

    /// Fetch, parse and swap the cache slot in one write.
    async fn refresh(&self) -> Result<Arc<Vec<Record>>> {
        let text = self.source.fetch_text().await?;
        let parsed = parse_feed(&text, &self.key_field);
        let records = Arc::new(parsed.records);

        log::info!(
            "Fetched {} records from {} ({} rows without {})",
            records.len(),
            self.source.describe(),
            parsed.diagnostics.excluded_rows,
            self.key_field
        );

        let mut cache = self.cache.write().await;
        if let Some(previous) = cache.as_ref() {
            if previous.diagnostics.schema_changed(&parsed.diagnostics) {
                log::warn!(
                    "Feed header changed from [{}] to [{}]",
                    previous.diagnostics.fields.join(", "),
                    parsed.diagnostics.fields.join(", ")
                );
            }
        }

        *cache = Some(CacheEntry {
            records: Arc::clone(&records),
            fetched: Instant::now(),
            fetched_at: Utc::now(),
            diagnostics: parsed.diagnostics,
        });

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::source::{MemoryFeedSource, Reply};

    const FRESHNESS: Duration = Duration::from_secs(300);
    const FEED: &str = "style_code,name,category\n\
                        abc-1,Ring One,Ring\n\
                        NK-2,Necklace,Necklace\n\
                        ,Orphan,Ring\n\
                        RG-3,Ring Three,Ring\n\
                        abc-1,Duplicate,Ring\n";

    fn client(source: &Arc<MemoryFeedSource>) -> FeedClient {
        FeedClient::new(Arc::clone(source) as Arc<dyn FeedSource>, "style_code", FRESHNESS)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_all_within_window_fetches_once() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        let first = feed.fetch_all().await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = feed.fetch_all().await.unwrap();

        assert_eq!(source.fetch_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_all_after_window_refetches() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        feed.fetch_all().await.unwrap();
        tokio::time::advance(FRESHNESS).await;
        source.set_body("style_code\nONLY-1\n");
        let records = feed.fetch_all().await.unwrap();

        assert_eq!(source.fetch_count(), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("style_code"), "ONLY-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fallback_on_status_error() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        let warm = feed.fetch_all().await.unwrap();
        tokio::time::advance(FRESHNESS * 3).await;
        source.set_reply(Reply::Status(500));

        let stale = feed.fetch_all().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(*stale, *warm);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fallback_on_transport_error() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        let warm = feed.fetch_all().await.unwrap();
        tokio::time::advance(FRESHNESS).await;
        source.set_reply(Reply::Unreachable);

        assert_eq!(*feed.fetch_all().await.unwrap(), *warm);
        // A failed refresh leaves the slot expired, so the next call retries.
        feed.fetch_all().await.unwrap();
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_cold_failure_is_typed_error() {
        let source = Arc::new(MemoryFeedSource::with_reply(Reply::Status(404)));
        let feed = client(&source);

        let err = feed.fetch_all().await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 404, .. }));
        assert!(feed.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_feed_is_not_an_error() {
        let source = Arc::new(MemoryFeedSource::new("style_code,name"));
        let feed = client(&source);

        assert!(feed.fetch_all().await.unwrap().is_empty());
        assert_eq!(feed.snapshot().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn test_fetch_by_key_ignores_case_and_whitespace() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        let record = feed.fetch_by_key("ABC-1 ").await.unwrap().unwrap();
        assert_eq!(record.value("name"), "Ring One");

        let record = feed.fetch_by_key("  nk-2").await.unwrap().unwrap();
        assert_eq!(record.value("name"), "Necklace");
    }

    #[tokio::test]
    async fn test_fetch_by_key_not_found() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        assert!(feed.fetch_by_key("missing").await.unwrap().is_none());
        assert!(feed.fetch_by_key("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_distinct_values_first_seen_order() {
        let source = Arc::new(MemoryFeedSource::new(
            "style_code,category\nA,Ring\nB,Ring\nC,Necklace\nD,\nE,Ring\n",
        ));
        let feed = client(&source);

        assert_eq!(
            feed.distinct_values("category").await.unwrap(),
            vec!["Ring", "Necklace"]
        );
        assert_eq!(
            feed.distinct_values(" Category ").await.unwrap(),
            vec!["Ring", "Necklace"]
        );
        assert!(feed.distinct_values("price").await.unwrap().is_empty());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_fetch() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        feed.fetch_all().await.unwrap();
        feed.clear_cache().await;
        assert!(feed.snapshot().await.is_none());

        feed.fetch_all().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_then_failure_is_cold() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        feed.fetch_all().await.unwrap();
        feed.clear_cache().await;
        source.set_reply(Reply::Unreachable);

        assert!(feed.fetch_all().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_age_and_diagnostics() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        assert!(feed.snapshot().await.is_none());
        feed.fetch_all().await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        let snapshot = feed.snapshot().await.unwrap();
        assert_eq!(snapshot.record_count, 4);
        assert!(snapshot.age >= Duration::from_secs(10) && snapshot.age < FRESHNESS);
        assert!(snapshot.fresh);
        assert_eq!(snapshot.diagnostics.excluded_rows, 1);
        assert_eq!(snapshot.diagnostics.fields, vec!["style_code", "name", "category"]);

        tokio::time::advance(FRESHNESS).await;
        assert!(!feed.snapshot().await.unwrap().fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schema_drift_replaces_cache() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = client(&source);

        feed.fetch_all().await.unwrap();
        tokio::time::advance(FRESHNESS).await;
        source.set_body("style_code,price\nabc-1,100\n");

        let records = feed.fetch_all().await.unwrap();
        assert_eq!(records[0].value("price"), "100");
        assert_eq!(records[0].get("name"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_cold_callers_agree() {
        let source = Arc::new(MemoryFeedSource::new(FEED));
        let feed = Arc::new(client(&source));

        let (a, b) = tokio::join!(
            {
                let feed = Arc::clone(&feed);
                async move { feed.fetch_all().await }
            },
            {
                let feed = Arc::clone(&feed);
                async move { feed.fetch_all().await }
            }
        );

        assert_eq!(*a.unwrap(), *b.unwrap());
        assert!((1..=2).contains(&source.fetch_count()));
    }
}
