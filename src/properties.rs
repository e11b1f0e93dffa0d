//! Typed, fail-closed access to loosely structured TOML tables.
//!
//! Sidekick files mix fixed keys with dynamic ones (`package:<name>` entries
//! under `[codec]`). [`PropertyBag`] wraps such a table so readers can pull out
//! strings, booleans and lists without matching on `toml::Value` themselves.
//! A missing key or a value of the wrong type reads as the zero value.
//!
//! The bag stays at the boundary: readers convert what they need into the
//! typed configuration model and drop the bag.

use toml::{Table, Value};

/// A borrowed view over one TOML table.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBag<'a> {
    table: Option<&'a Table>,
}

impl<'a> PropertyBag<'a> {
    pub fn new(table: &'a Table) -> Self {
        PropertyBag { table: Some(table) }
    }

    /// A bag with no keys.
    pub fn empty() -> Self {
        PropertyBag { table: None }
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.table.and_then(|t| t.get(key))
    }

    /// The nested table at `key`, or an empty bag.
    pub fn section(&self, key: &str) -> PropertyBag<'a> {
        match self.value(key) {
            Some(Value::Table(t)) => PropertyBag::new(t),
            _ => PropertyBag::empty(),
        }
    }

    /// The string at `key`; empty when missing or not a string.
    pub fn get_string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    /// The string at `key`, if it is one and is not empty.
    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        match self.value(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// The boolean at `key`. Accepts the strings `"true"` and `"false"` as
    /// sidekick files sometimes quote them.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.value(key) {
            Some(Value::Boolean(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    /// The list of strings at `key`.
    ///
    /// A TOML array keeps only its string elements; a plain string is split
    /// on commas with blank items dropped.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.value(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) => split_list(s),
            _ => Vec::new(),
        }
    }

    /// String entries whose key starts with `prefix`, with the prefix removed.
    /// Sorted by key.
    pub fn prefixed_strings(&self, prefix: &str) -> Vec<(&'a str, &'a str)> {
        let mut entries: Vec<(&'a str, &'a str)> = self
            .table
            .into_iter()
            .flat_map(|t| t.iter())
            .filter_map(|(k, v)| {
                let name = k.strip_prefix(prefix)?;
                Some((name, v.as_str()?))
            })
            .collect();
        entries.sort();
        entries
    }
}

/// Splits a comma separated list, trimming items and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a comma separated `key=value` list such as
/// `package=foo,source=google.protobuf,force-used=true`.
///
/// Items without exactly one `=` are skipped. Later duplicates win.
pub fn parse_key_values(value: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for item in value.split(',') {
        let mut parts = item.splitn(3, '=');
        let (Some(key), Some(val), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let key = key.trim().to_string();
        let val = val.trim().to_string();
        if key.is_empty() {
            continue;
        }
        pairs.retain(|(k, _)| k != &key);
        pairs.push((key, val));
    }
    pairs
}
