//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::normalize_field;
use crate::utils::url::sheet_csv_url;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Spreadsheet feed location and cache policy
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Public site settings used for product links
    #[serde(default)]
    pub site: SiteConfig,

    /// Sheet header names for each product attribute
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.sheet_id.trim().is_empty() && self.feed.url_template.is_none() {
            return Err(AppError::validation(
                "feed.sheet_id is empty and no feed.url_template is set",
            ));
        }
        if self.feed.key_field.trim().is_empty() {
            return Err(AppError::validation("feed.key_field is empty"));
        }
        if normalize_field(&self.feed.key_field) != normalize_field(&self.columns.style_code) {
            return Err(AppError::validation(
                "feed.key_field and columns.style_code must name the same column",
            ));
        }
        if self.feed.freshness_secs == 0 {
            return Err(AppError::validation("feed.freshness_secs must be > 0"));
        }
        sheet_csv_url(&self.feed)?;
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.site.base_url)?;
        Ok(())
    }
}

/// Feed location and cache policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Spreadsheet identifier from the sheet's edit URL
    #[serde(default)]
    pub sheet_id: String,

    /// Tab name inside the spreadsheet
    #[serde(default = "defaults::sheet_name")]
    pub sheet_name: String,

    /// Override for the CSV export URL (`{sheet_id}` and `{sheet_name}` are substituted)
    #[serde(default)]
    pub url_template: Option<String>,

    /// Field that identifies a record; rows without it are dropped
    #[serde(default = "defaults::key_field")]
    pub key_field: String,

    /// How long a successful fetch is served without re-fetching
    #[serde(default = "defaults::freshness")]
    pub freshness_secs: u64,
}

impl FeedConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            sheet_name: defaults::sheet_name(),
            url_template: None,
            key_field: defaults::key_field(),
            freshness_secs: defaults::freshness(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for feed requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Public site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL product links and QR targets are built from
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Store name shown in listings
    #[serde(default = "defaults::store_name")]
    pub store_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            store_name: defaults::store_name(),
        }
    }
}

/// Sheet header names for each product attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "defaults::col_style_code")]
    pub style_code: String,
    #[serde(default = "defaults::col_name")]
    pub name: String,
    #[serde(default = "defaults::col_category")]
    pub category: String,
    #[serde(default = "defaults::col_metal_type")]
    pub metal_type: String,
    #[serde(default = "defaults::col_gross_weight")]
    pub gross_weight: String,
    #[serde(default = "defaults::col_metal_weight")]
    pub metal_weight: String,
    #[serde(default = "defaults::col_dia_weight")]
    pub dia_weight: String,
    #[serde(default = "defaults::col_purity")]
    pub purity: String,
    #[serde(default = "defaults::col_price")]
    pub price: String,
    #[serde(default = "defaults::col_description")]
    pub description: String,
    #[serde(default = "defaults::col_image_url")]
    pub image_url: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            style_code: defaults::col_style_code(),
            name: defaults::col_name(),
            category: defaults::col_category(),
            metal_type: defaults::col_metal_type(),
            gross_weight: defaults::col_gross_weight(),
            metal_weight: defaults::col_metal_weight(),
            dia_weight: defaults::col_dia_weight(),
            purity: defaults::col_purity(),
            price: defaults::col_price(),
            description: defaults::col_description(),
            image_url: defaults::col_image_url(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn sheet_name() -> String {
        "Sheet1".into()
    }
    pub fn key_field() -> String {
        "style_code".into()
    }
    pub fn freshness() -> u64 {
        5 * 60
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; catalog-feed/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Site defaults
    pub fn base_url() -> String {
        "http://localhost:8080".into()
    }
    pub fn store_name() -> String {
        "Catalog".into()
    }

    // Column defaults
    pub fn col_style_code() -> String {
        "style_code".into()
    }
    pub fn col_name() -> String {
        "name".into()
    }
    pub fn col_category() -> String {
        "category".into()
    }
    pub fn col_metal_type() -> String {
        "metal_type".into()
    }
    pub fn col_gross_weight() -> String {
        "gross_weight".into()
    }
    pub fn col_metal_weight() -> String {
        "metal_weight".into()
    }
    pub fn col_dia_weight() -> String {
        "dia_weight".into()
    }
    pub fn col_purity() -> String {
        "purity".into()
    }
    pub fn col_price() -> String {
        "price".into()
    }
    pub fn col_description() -> String {
        "description".into()
    }
    pub fn col_image_url() -> String {
        "image_url".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
