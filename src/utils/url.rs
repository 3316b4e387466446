// src/utils/url.rs

//! Feed and product link building.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;
use url::form_urlencoded;

use crate::error::{AppError, Result};
use crate::models::FeedConfig;

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// Characters kept literal in a short-link code segment.
const CODE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the CSV export URL for the configured sheet tab.
///
/// A configured `url_template` wins over the Google Sheets export URL; its
/// `{sheet_id}` and `{sheet_name}` placeholders are substituted URL-encoded.
///
/// # Examples
/// ```
/// use catalog_feed::models::FeedConfig;
/// use catalog_feed::utils::url::sheet_csv_url;
///
/// let feed = FeedConfig {
///     sheet_id: "abc123".to_string(),
///     sheet_name: "Sheet1".to_string(),
///     ..FeedConfig::default()
/// };
/// assert_eq!(
///     sheet_csv_url(&feed).unwrap(),
///     "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out%3Acsv&sheet=Sheet1"
/// );
/// ```
pub fn sheet_csv_url(feed: &FeedConfig) -> Result<String> {
    if let Some(template) = &feed.url_template {
        let url = template
            .replace("{sheet_id}", &encode(&feed.sheet_id))
            .replace("{sheet_name}", &encode(&feed.sheet_name));
        return Ok(Url::parse(&url)?.to_string());
    }

    let mut url = Url::parse(SHEETS_BASE)?;
    url.path_segments_mut()
        .map_err(|_| AppError::config("sheets base URL cannot hold a path"))?
        .pop_if_empty()
        .extend([feed.sheet_id.trim(), "gviz", "tq"]);
    url.query_pairs_mut()
        .append_pair("tqx", "out:csv")
        .append_pair("sheet", &feed.sheet_name);
    Ok(url.to_string())
}

/// URL of the spreadsheet editor for the given sheet.
pub fn sheet_edit_url(sheet_id: &str) -> String {
    format!("{SHEETS_BASE}{}/edit", encode(sheet_id.trim()))
}

/// Product detail page URL: `{base}/product.html?style={code}`.
pub fn product_page_url(base_url: &str, code: &str) -> Result<String> {
    let mut url = with_segments(base_url, &["product.html"])?;
    url.query_pairs_mut().append_pair("style", code.trim());
    Ok(url.to_string())
}

/// Short link encoded into printed QR labels: `{base}/p/{code}`.
///
/// The code is escaped as a single segment, so `/`, `&` and `=` survive a
/// scan. Fewer characters give a sparser QR pattern, which scans better at small
/// print sizes.
///
/// # Examples
/// ```
/// use catalog_feed::utils::url::qr_target_url;
///
/// assert_eq!(
///     qr_target_url("https://shop.example/acpl", "RG 01").unwrap(),
///     "https://shop.example/acpl/p/RG%2001"
/// );
/// ```
pub fn qr_target_url(base_url: &str, code: &str) -> Result<String> {
    let mut url = with_segments(base_url, &["p"])?;
    let path = format!(
        "{}/{}",
        url.path(),
        utf8_percent_encode(code.trim(), CODE_SEGMENT)
    );
    url.set_path(&path);
    Ok(url.to_string())
}

/// Turn a scanned QR payload into a lookup key.
///
/// Product page links yield their `style` parameter, short links yield the
/// segment after `/p/`, and any other text is taken as the key itself.
/// Blank payloads yield `None`.
pub fn resolve_scanned(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(text) {
        if matches!(url.scheme(), "http" | "https") {
            if let Some(code) = style_param(&url).or_else(|| short_link_code(&url)) {
                return Some(code);
            }
        }
    }

    Some(text.to_string())
}

fn style_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "style")
        .map(|(_, value)| value.trim().to_string())
        .filter(|code| !code.is_empty())
}

fn short_link_code(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., "p", code] => Some(decode(code)).filter(|code| !code.trim().is_empty()),
        _ => None,
    }
}

fn with_segments(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("base URL cannot hold a path: {base_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Percent-decode a single path segment.
fn decode(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8_lossy()
        .trim()
        .to_string()
}
