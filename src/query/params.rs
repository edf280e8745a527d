//! # Query Parameter Normalization
//!
//! Splits a raw request parameter map into the reserved parts the engine
//! understands (`page`, `limit`, `sort`, `searchTerm`) and a residual map of
//! domain keys that are only ever used as allow-listed equality filters.
//!
//! Parsing never fails. Malformed paging input is kept as "absent" and
//! resolved to defaults later.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Page number key
pub const PAGE_KEY: &str = "page";

/// Page size key
pub const LIMIT_KEY: &str = "limit";

/// Sort specification key
pub const SORT_KEY: &str = "sort";

/// Free-text search key
pub const SEARCH_KEY: &str = "searchTerm";

/// Keys that never reach filter construction
pub const RESERVED_KEYS: [&str; 4] = [PAGE_KEY, LIMIT_KEY, SORT_KEY, SEARCH_KEY];

/// Returns true if `key` is reserved for the engine
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Raw, untyped request parameters
///
/// Built from query-string pairs (a repeated key becomes an array) or
/// from a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams(BTreeMap<String, Value>);

impl RawParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ordered `(key, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in pairs {
            let value = Value::String(value.into());
            match map.entry(key.into()) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Value::Array(items) => items.push(value),
                    existing => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                },
            }
        }
        Self(map)
    }

    /// Build from a JSON object; anything else yields an empty set
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(obj) => Self::from_map(obj),
            _ => Self::default(),
        }
    }

    fn from_map(obj: &Map<String, Value>) -> Self {
        Self(obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of raw keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Paging input as supplied; `None` means absent or unreadable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Typed view of the request parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// Paging input
    pub pagination: PaginationParams,

    /// Raw sort string, e.g. `-age,name`
    pub sort: Option<String>,

    /// Trimmed, non-empty search term
    pub search_term: Option<String>,

    /// Every non-reserved key
    pub residual: BTreeMap<String, Value>,
}

impl QueryParams {
    /// Normalize raw parameters
    pub fn parse(raw: &RawParams) -> Self {
        let mut params = QueryParams::default();

        for (key, value) in &raw.0 {
            match key.as_str() {
                PAGE_KEY => params.pagination.page = read_integer(value),
                LIMIT_KEY => params.pagination.limit = read_integer(value),
                SORT_KEY => params.sort = read_text(value),
                SEARCH_KEY => params.search_term = read_text(value),
                _ => {
                    params.residual.insert(key.clone(), value.clone());
                }
            }
        }

        params
    }

    /// Residual value for an allow-listed field
    pub fn domain_value(&self, field: &str) -> Option<&Value> {
        if is_reserved(field) {
            return None;
        }
        self.residual.get(field)
    }
}

impl From<&RawParams> for QueryParams {
    fn from(raw: &RawParams) -> Self {
        Self::parse(raw)
    }
}

/// Reads an integer from a string or number. Fractions truncate toward
/// zero; anything unreadable is `None`.
fn read_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        // Repeated keys: the first readable occurrence wins.
        Value::Array(items) => items.iter().find_map(read_integer),
        _ => None,
    }
}

/// Reads a trimmed, non-empty string
fn read_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => return items.iter().find_map(read_text),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
