//! # Search Stage Construction
//!
//! A free-text term matched case-insensitively as a substring of any of
//! the caller's fields.

use super::condition::Condition;
use super::params::QueryParams;

/// Search term plus the fields it is matched against
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDescriptor {
    pub term: String,
    pub fields: Vec<String>,
}

impl SearchDescriptor {
    /// Returns `None` when there is no term or no fields.
    pub fn from_params(params: &QueryParams, fields: &[&str]) -> Option<Self> {
        let term = params.search_term.as_ref()?;
        let fields: Vec<String> = fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            term: term.clone(),
            fields,
        })
    }

    /// OR across the fields
    pub fn to_condition(&self) -> Condition {
        Condition::Any(
            self.fields
                .iter()
                .map(|field| Condition::contains(field.clone(), &self.term))
                .collect(),
        )
    }
}
