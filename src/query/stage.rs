//! # Pipeline Stages
//!
//! Typed aggregation stages. Callers supply their own (joins, unwinds,
//! projections) and the aggregation builder appends match, sort and
//! window stages after them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::Condition;
use super::sort::SortSpec;

/// One step of an aggregation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Keep documents satisfying the condition
    Match(Condition),

    /// Attach matching documents from another collection as an array
    Lookup(Lookup),

    /// One output document per element of the array at `path`
    Unwind {
        path: String,
        #[serde(default)]
        preserve_null_and_empty: bool,
    },

    /// Reshape documents
    Project(Vec<ProjectField>),

    /// Order documents
    Sort(SortSpec),

    /// Drop the first n documents
    Skip(u64),

    /// Keep at most n documents
    Limit(u64),

    /// Replace the stream with a single `{ <field>: <count> }` document
    Count(String),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::Lookup(_) => "lookup",
            Stage::Unwind { .. } => "unwind",
            Stage::Project(_) => "project",
            Stage::Sort(_) => "sort",
            Stage::Skip(_) => "skip",
            Stage::Limit(_) => "limit",
            Stage::Count(_) => "count",
        }
    }

    /// Unwind that drops documents with a missing or empty array
    pub fn unwind(path: impl Into<String>) -> Self {
        Stage::Unwind {
            path: path.into(),
            preserve_null_and_empty: false,
        }
    }

    /// Unwind that keeps documents with a missing or empty array
    pub fn unwind_preserving(path: impl Into<String>) -> Self {
        Stage::Unwind {
            path: path.into(),
            preserve_null_and_empty: true,
        }
    }
}

/// Equality join against another collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    #[serde(rename = "as")]
    pub as_field: String,
}

impl Lookup {
    pub fn new(
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        }
    }
}

/// One output field of a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectField {
    pub field: String,
    pub projection: Projection,
}

impl ProjectField {
    pub fn include(field: impl Into<String>) -> Self {
        Self::new(field, Projection::Include)
    }

    pub fn exclude(field: impl Into<String>) -> Self {
        Self::new(field, Projection::Exclude)
    }

    pub fn path(field: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(field, Projection::Path(source.into()))
    }

    pub fn size(field: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(field, Projection::Size(source.into()))
    }

    pub fn new(field: impl Into<String>, projection: Projection) -> Self {
        Self {
            field: field.into(),
            projection,
        }
    }
}

/// How a projected field is produced
///
/// If any field is produced (anything but `Exclude`), the projection keeps
/// only the listed fields plus `_id`; otherwise it removes the excluded
/// fields and keeps the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Copy the field as is
    Include,
    /// Drop the field
    Exclude,
    /// Copy the value found at another path
    Path(String),
    /// Length of the array at another path, 0 if absent
    Size(String),
    /// A constant
    Literal(Value),
}
