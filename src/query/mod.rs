//! # Query Composition Engine
//!
//! Turns untyped request parameters into a filtered, searched, sorted and
//! paginated read plus an independent total count.
//!
//! Two builders share one composition model:
//! - [`QueryBuilder`] narrows a base query (collection + scope)
//! - [`AggregationQueryBuilder`] extends a caller-supplied stage pipeline
//!
//! Neither builder reads the store until `execute` or `count_total` is
//! awaited. Each request gets its own builder.

pub mod aggregation;
pub mod builder;
pub mod condition;
pub mod filter;
pub mod pagination;
pub mod params;
pub mod path;
pub mod search;
pub mod sort;
pub mod stage;

pub use aggregation::{AggregationQueryBuilder, TOTAL_FIELD};
pub use builder::QueryBuilder;
pub use condition::{Condition, TextPattern};
pub use filter::FilterDescriptor;
pub use pagination::{Meta, Pagination, ResultEnvelope, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use params::{QueryParams, RawParams};
pub use search::SearchDescriptor;
pub use sort::{SortDirection, SortKey, SortSpec};
pub use stage::{Lookup, ProjectField, Projection, Stage};
