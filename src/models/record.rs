//! Feed record data structure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalize a header cell or field name into a record key.
pub fn normalize_field(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One data row of the feed, keyed by normalized header name.
///
/// The field set is whatever the header row of the fetch contained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any earlier value for the same key.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Raw value of a field, if the header had that column.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Value of a field, or an empty string when absent.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Whether the field exists and is non-blank after trimming.
    pub fn has_value(&self, field: &str) -> bool {
        !self.value(field).trim().is_empty()
    }

    /// Iterate over `(field, value)` pairs in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}
