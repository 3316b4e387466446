//! Catalog feed CLI
//!
//! Browse the published product sheet from a terminal and export the links
//! printed on QR labels.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog_feed::{
    error::Result,
    models::{Config, Product},
    services::{Catalog, FeedClient},
    source::{FeedSource, HttpFeedSource, LocalFeedSource},
    utils::url,
};
use clap::{Parser, Subcommand};

/// catalog-feed - Published product sheet browser
#[derive(Parser, Debug)]
#[command(
    name = "catalog-feed",
    version,
    about = "Browse a published product spreadsheet"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "catalog.toml")]
    config: PathBuf,

    /// Read the feed from a local CSV export instead of the published sheet
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products in sheet order
    List {
        /// Only products in this category
        #[arg(long)]
        category: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one product by style code or scanned QR text
    Show {
        /// Style code, product link or QR short link
        code: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List distinct categories
    Categories,

    /// Print QR label links as CSV (style code, name, link)
    Links {
        /// Only style codes containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Show feed location, counts and parse diagnostics
    Info,
}

/// Initialize logging with the given default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Pick the feed source: a local export if given, otherwise the published sheet.
fn build_source(file: Option<&Path>, config: &Config) -> Result<Arc<dyn FeedSource>> {
    Ok(match file {
        Some(path) => Arc::new(LocalFeedSource::new(path)),
        None => Arc::new(HttpFeedSource::from_config(config)?),
    })
}

/// Quote a CSV field when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn print_product(product: &Product, config: &Config) -> Result<()> {
    let rows = [
        ("Style code", product.style_code.clone()),
        ("Name", product.name.clone()),
        ("Category", product.category.clone()),
        ("Metal", product.metal_type.clone()),
        ("Gross weight", product.gross_weight.clone()),
        ("Metal weight", product.metal_weight.clone()),
        ("Diamond weight", product.dia_weight.clone()),
        ("Purity", product.purity.clone()),
        (
            "Price",
            product.price.map(|p| p.to_string()).unwrap_or_default(),
        ),
        ("Description", product.description.clone()),
        ("Image", product.image_url.clone()),
        (
            "Page",
            url::product_page_url(&config.site.base_url, &product.style_code)?,
        ),
        (
            "QR link",
            url::qr_target_url(&config.site.base_url, &product.style_code)?,
        ),
    ];

    for (label, value) in rows.iter().filter(|(_, value)| !value.is_empty()) {
        println!("{label:>14}: {value}");
    }
    Ok(())
}

/// Open the catalog over the selected feed source.
fn open_catalog(file: Option<&Path>, config: &Config) -> Result<Catalog> {
    let feed = Arc::new(FeedClient::with_source(config, build_source(file, config)?));
    log::debug!("Reading feed from {}", feed.source_description());
    Ok(Catalog::new(feed, config.columns.clone()))
}

fn validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");
    log::info!("Feed URL: {}", url::sheet_csv_url(&config.feed)?);
    Ok(())
}

/// Run a command.
async fn run(command: Command, file: Option<&Path>, config: &Config) -> Result<()> {
    match command {
        Command::List { category, json } => {
            let catalog = open_catalog(file, config)?;
            let products = match category {
                Some(category) => catalog.by_category(&category).await?,
                None => catalog.products().await?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else if products.is_empty() {
                log::info!("No products found.");
            } else {
                for product in &products {
                    println!(
                        "{:<14} {:<32} {:<14} {}",
                        product.style_code,
                        product.name,
                        product.category,
                        product.price.map(|p| p.to_string()).unwrap_or_default()
                    );
                }
            }
        }

        Command::Show { code, json } => match open_catalog(file, config)?.scan(&code).await? {
            Some(product) if json => println!("{}", serde_json::to_string_pretty(&product)?),
            Some(product) => print_product(&product, config)?,
            None => log::warn!("No product matches '{}'", code.trim()),
        },

        Command::Categories => {
            for category in open_catalog(file, config)?.categories().await? {
                println!("{category}");
            }
        }

        Command::Links { filter } => {
            let products = open_catalog(file, config)?
                .filter_codes(filter.as_deref().unwrap_or(""))
                .await?;

            println!("style_code,name,link");
            for product in &products {
                let link = url::qr_target_url(&config.site.base_url, &product.style_code)?;
                println!(
                    "{},{},{}",
                    csv_field(&product.style_code),
                    csv_field(&product.name),
                    csv_field(&link)
                );
            }
            log::info!("{} label links", products.len());
        }

        Command::Info => {
            let catalog = open_catalog(file, config)?;
            let feed = catalog.feed();
            let stats = catalog.stats().await?;
            log::info!("Store: {}", config.site.store_name);
            log::info!("Feed: {}", feed.source_description());
            if !config.feed.sheet_id.is_empty() {
                log::info!("Edit sheet: {}", url::sheet_edit_url(&config.feed.sheet_id));
            }
            log::info!(
                "Products: {}, categories: {}",
                stats.products,
                stats.categories
            );

            if let Some(snapshot) = feed.snapshot().await {
                log::info!("Fetched at: {}", snapshot.fetched_at.to_rfc3339());
                log::info!("Columns: {}", snapshot.diagnostics.fields.join(", "));
                log::info!(
                    "Rows: {} read, {} without {}",
                    snapshot.diagnostics.data_rows,
                    snapshot.diagnostics.excluded_rows,
                    feed.key_field()
                );
            }
        }

        Command::Validate => validate(config)?,
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
        Config::default()
    });

    run(cli.command, cli.file.as_deref(), &config).await?;

    log::debug!("Done");

    Ok(())
}
