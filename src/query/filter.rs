//! # Filter Stage Construction
//!
//! Equality constraints built from allow-listed domain parameters.

use serde_json::Value;

use super::condition::Condition;
use super::params::QueryParams;

/// Field name to expected value, in allow-list order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDescriptor {
    pub fields: Vec<(String, Value)>,
}

impl FilterDescriptor {
    /// Build from the residual parameters, keeping only allow-listed keys.
    ///
    /// Reserved keys never qualify, even when listed. A listed field that is
    /// absent from the parameters is skipped.
    pub fn from_params(params: &QueryParams, allowed: &[&str]) -> Self {
        let mut fields: Vec<(String, Value)> = Vec::new();
        for field in allowed {
            if fields.iter().any(|(f, _)| f == field) {
                continue;
            }
            if let Some(value) = params.domain_value(field) {
                fields.push((field.to_string(), value.clone()));
            }
        }
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Conjunction of the equality constraints, or `None` when empty
    pub fn to_condition(&self) -> Option<Condition> {
        if self.fields.is_empty() {
            return None;
        }
        Some(Condition::All(
            self.fields
                .iter()
                .map(|(field, value)| Condition::eq(field.clone(), value.clone()))
                .collect(),
        ))
    }
}
