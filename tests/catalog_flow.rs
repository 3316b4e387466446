//! End-to-end catalog queries over a CSV export on disk.

use std::fs;
use std::sync::Arc;

use catalog_feed::models::Config;
use catalog_feed::services::{Catalog, FeedClient};
use catalog_feed::source::LocalFeedSource;
use catalog_feed::utils::url::qr_target_url;

const EXPORT: &str = "\
\"Style_Code\",\"Name\",\"Category\",\"Metal_Type\",\"Price\",\"Description\"
\"RG-01\",\"Solitaire\",\"Ring\",\"18K\",\"1,25,000\",\"Round cut, \"\"VVS\"\" clarity\"
\"\",\"Unlabelled\",\"Ring\",\"\",\"\",\"\"
\"NK-02\",\"\",\"Necklace\",\"22K\",\"54000\",\"\"
\"RG-03\",\"Band\",\"Ring\",\"PT\",\"\",\"\"
";

fn setup(dir: &tempfile::TempDir) -> (Config, Catalog) {
    let csv_path = dir.path().join("export.csv");
    fs::write(&csv_path, EXPORT).unwrap();

    let config_path = dir.path().join("catalog.toml");
    fs::write(
        &config_path,
        "[feed]\nsheet_id = \"abc\"\nfreshness_secs = 60\n\n[site]\nbase_url = \"https://shop.example/acpl\"\n",
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    config.validate().unwrap();

    let source = Arc::new(LocalFeedSource::new(&csv_path));
    let feed = Arc::new(FeedClient::with_source(&config, source));
    let catalog = Catalog::new(feed, config.columns.clone());
    (config, catalog)
}

#[tokio::test]
async fn lists_products_from_export() {
    let dir = tempfile::tempdir().unwrap();
    let (_, catalog) = setup(&dir);

    let products = catalog.products().await.unwrap();
    let codes: Vec<_> = products.iter().map(|p| p.style_code.as_str()).collect();
    assert_eq!(codes, vec!["RG-01", "NK-02", "RG-03"]);

    assert_eq!(products[0].description, "Round cut, \"VVS\" clarity");
    assert_eq!(products[0].price, Some(125000.0));
    assert_eq!(products[1].name, "NK-02");
}

#[tokio::test]
async fn categories_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let (_, catalog) = setup(&dir);

    assert_eq!(catalog.categories().await.unwrap(), vec!["Ring", "Necklace"]);

    let stats = catalog.stats().await.unwrap();
    assert_eq!(stats.products, 3);
    assert_eq!(stats.categories, 2);

    let snapshot = catalog.feed().snapshot().await.unwrap();
    assert_eq!(snapshot.diagnostics.excluded_rows, 1);
    assert_eq!(snapshot.diagnostics.data_rows, 4);
}

#[tokio::test]
async fn scanned_label_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (config, catalog) = setup(&dir);

    let link = qr_target_url(&config.site.base_url, "RG-03").unwrap();
    assert_eq!(link, "https://shop.example/acpl/p/RG-03");

    let product = catalog.scan(&link).await.unwrap().unwrap();
    assert_eq!(product.name, "Band");
}

#[tokio::test]
async fn missing_export_falls_back_until_cache_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let (_, catalog) = setup(&dir);

    catalog.products().await.unwrap();
    fs::remove_file(dir.path().join("export.csv")).unwrap();

    // Still inside the freshness window.
    assert_eq!(catalog.products().await.unwrap().len(), 3);

    catalog.feed().clear_cache().await;
    let err = catalog.products().await.unwrap_err();
    assert!(err.is_fetch_error());
}
