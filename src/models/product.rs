//! Typed product view over a feed record.

use serde::Serialize;

use super::{ColumnConfig, Record, normalize_field};

/// A catalog product projected from a [`Record`] using the column mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Unique style code (the feed's key field)
    pub style_code: String,

    /// Display name; falls back to the style code when the sheet leaves it blank
    pub name: String,

    pub category: String,
    pub metal_type: String,
    pub gross_weight: String,
    pub metal_weight: String,
    pub dia_weight: String,
    pub purity: String,

    /// Numeric price, if the sheet has a parseable one
    pub price: Option<f64>,

    pub description: String,
    pub image_url: String,
}

impl Product {
    /// Project a record onto the configured columns.
    pub fn from_record(record: &Record, columns: &ColumnConfig) -> Self {
        let value = |column: &str| record.value(&normalize_field(column));
        let text = |column: &str| value(column).trim().to_string();

        let style_code = text(&columns.style_code);
        let name = Some(text(&columns.name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| style_code.clone());

        Self {
            name,
            category: text(&columns.category),
            metal_type: text(&columns.metal_type),
            gross_weight: text(&columns.gross_weight),
            metal_weight: text(&columns.metal_weight),
            dia_weight: text(&columns.dia_weight),
            purity: text(&columns.purity),
            price: parse_price(value(&columns.price)),
            description: text(&columns.description),
            image_url: text(&columns.image_url),
            style_code,
        }
    }
}

/// Parse a sheet price cell, ignoring currency symbols and grouping commas.
///
/// Only digits and `.` are kept, so `"₹1,25,000.50"` parses as `125000.5`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
