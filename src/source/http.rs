//! Published spreadsheet export over HTTP(S).

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::Config;
use crate::source::FeedSource;
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::url::sheet_csv_url;

/// Fetches the feed with a single GET per call. No retries.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: String,
}

impl HttpFeedSource {
    /// Create a source for an explicit URL.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Create a source for the sheet named in the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        let url = sheet_csv_url(&config.feed)?;
        Ok(Self::new(client, url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_text(&self) -> Result<String> {
        fetch_text(&self.client, &self.url).await
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
