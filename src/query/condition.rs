//! # Match Conditions
//!
//! Typed predicates produced by the filter and search stages and evaluated
//! by a document store.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::values_at;

/// A match condition over a single document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Field equals value. An array value matches any of its elements.
    Eq { field: String, value: Value },

    /// Field contains the pattern's term, case-insensitively
    Contains { field: String, pattern: TextPattern },

    /// At least one condition holds. Empty never matches.
    Any(Vec<Condition>),

    /// Every condition holds. Empty always matches.
    All(Vec<Condition>),
}

impl Condition {
    /// Condition that matches every document
    pub fn always() -> Self {
        Condition::All(Vec::new())
    }

    /// Equality condition
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Condition::Eq {
            field: field.into(),
            value,
        }
    }

    /// Case-insensitive substring condition
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        Condition::Contains {
            field: field.into(),
            pattern: TextPattern::new(term),
        }
    }

    /// Conjunction, flattening nested `All`s
    pub fn and(self, other: Condition) -> Self {
        let mut parts = match self {
            Condition::All(parts) => parts,
            c => vec![c],
        };
        match other {
            Condition::All(more) => parts.extend(more),
            c => parts.push(c),
        }
        Condition::All(parts)
    }

    /// Returns true if this condition places no constraint
    pub fn is_always(&self) -> bool {
        matches!(self, Condition::All(parts) if parts.iter().all(Condition::is_always))
    }

    /// Check if a document matches this condition
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Condition::Eq { field, value } => {
                let found = values_at(doc, field);
                match value {
                    Value::Array(wanted) => wanted
                        .iter()
                        .any(|w| found.iter().any(|v| loose_eq_or_element(v, w))),
                    wanted => found.iter().any(|v| loose_eq_or_element(v, wanted)),
                }
            }
            Condition::Contains { field, pattern } => values_at(doc, field)
                .into_iter()
                .any(|v| pattern.matches_value(v)),
            Condition::Any(parts) => parts.iter().any(|c| c.matches(doc)),
            Condition::All(parts) => parts.iter().all(|c| c.matches(doc)),
        }
    }
}

/// Equality against a document value, looking inside document arrays
fn loose_eq_or_element(doc_value: &Value, wanted: &Value) -> bool {
    if loose_eq(doc_value, wanted) {
        return true;
    }
    match doc_value {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, wanted)),
        _ => false,
    }
}

/// Query-string values arrive untyped, so a string also matches a number
/// or boolean with the same textual form.
pub(crate) fn loose_eq(doc_value: &Value, wanted: &Value) -> bool {
    if doc_value == wanted {
        return true;
    }
    match (doc_value, wanted) {
        (Value::Number(n), Value::String(s)) => {
            if n.to_string() == *s {
                return true;
            }
            match (n.as_f64(), s.trim().parse::<f64>()) {
                (Some(a), Ok(b)) => a == b,
                _ => false,
            }
        }
        (Value::Bool(b), Value::String(s)) => b.to_string() == *s,
        (Value::Null, Value::String(s)) => s == "null",
        _ => false,
    }
}

/// A literal, case-insensitive substring pattern
///
/// The term is escaped before compiling, so user input never acts as
/// regex syntax.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TextPattern {
    term: String,
    // None when the term exceeds the regex size limit
    regex: Option<Regex>,
}

impl TextPattern {
    /// Compile a pattern for `term`
    pub fn new(term: &str) -> Self {
        let regex = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .ok();
        Self {
            term: term.to_string(),
            regex,
        }
    }

    /// Check a string for the term
    pub fn is_match(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => text.to_lowercase().contains(&self.term.to_lowercase()),
        }
    }

    /// Strings match by content; string arrays match if any element does.
    /// Other value types never match.
    fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.is_match(s),
            Value::Array(items) => items
                .iter()
                .any(|i| i.as_str().is_some_and(|s| self.is_match(s))),
            _ => false,
        }
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextPattern").field(&self.term).finish()
    }
}

impl From<String> for TextPattern {
    fn from(term: String) -> Self {
        Self::new(&term)
    }
}

impl From<TextPattern> for String {
    fn from(pattern: TextPattern) -> Self {
        pattern.term
    }
}
