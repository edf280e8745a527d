//! # Sort Stage Construction
//!
//! Parses `-age,name` style sort strings and orders documents by them.
//!
//! Field order is tie-break precedence. The sort is stable, so documents
//! equal on every key keep their incoming order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::value_at;

/// Creation timestamp field used by the default sort
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Sort used when the request carries none: newest first
pub const DEFAULT_SORT: &str = "-createdAt";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered sort keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse a comma-separated field list; `-` prefix means descending.
    ///
    /// Blank entries and bare `-` are skipped. If nothing usable remains
    /// the default sort applies.
    pub fn parse(value: Option<&str>) -> Self {
        let keys: Vec<SortKey> = value
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|part| match part.strip_prefix('-') {
                Some(field) => {
                    let field = field.trim();
                    (!field.is_empty()).then(|| SortKey::desc(field))
                }
                None => {
                    let field = part.strip_prefix('+').unwrap_or(part).trim();
                    (!field.is_empty()).then(|| SortKey::asc(field))
                }
            })
            .collect();

        if keys.is_empty() {
            Self::default()
        } else {
            Self { keys }
        }
    }

    /// Compare two documents by every key in turn
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(value_at(a, &key.field), value_at(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort
    pub fn sort(&self, documents: &mut [Value]) {
        documents.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            keys: vec![SortKey::desc(CREATED_AT_FIELD)],
        }
    }
}

/// Total order over optional JSON values.
///
/// Ordering rules:
/// - missing < null < bool < number < string < array < object
/// - among strings, RFC 3339 timestamps come first in chronological order,
///   then every other string in byte order
/// - arrays compare element-wise, objects are equal to each other
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    let (a_rank, b_rank) = (type_rank(a), type_rank(b));
    if a_rank != b_rank {
        return a_rank.cmp(&b_rank);
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => StringKey::of(x).cmp(&StringKey::of(y)),
        (Value::Array(x), Value::Array(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                let ordering = compare_present(xi, yi);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// Sort key for a string. Every pair of strings compares under the same
/// rule, so timestamps and plain text can share a field.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum StringKey<'a> {
    Timestamp(DateTime<Utc>),
    Text(&'a str),
}

impl<'a> StringKey<'a> {
    fn of(s: &'a str) -> Self {
        match parse_timestamp(s) {
            Some(at) => StringKey::Timestamp(at),
            None => StringKey::Text(s),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Too short or not starting with a year
    if s.len() < 20 || !s.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
