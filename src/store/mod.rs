//! # Document Store
//!
//! The seam between the query builders and whatever holds the documents.
//! A store answers three requests: a filtered, sorted, windowed find; a
//! count of documents matching a condition; and an aggregation pipeline
//! run against a named collection.

mod errors;
pub mod memory;
pub mod pipeline;

pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryStore;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::query::{Condition, SortSpec, Stage};

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Trait for document store backends
pub trait DocumentStore: Send + Sync {
    /// Documents of a collection matching the filter, sorted, then windowed
    fn find<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, Vec<Value>>;

    /// Number of documents of a collection matching the filter
    fn count<'a>(&'a self, collection: &'a str, filter: &'a Condition) -> StoreFuture<'a, u64>;

    /// Run stages in order over a collection
    fn aggregate<'a>(&'a self, collection: &'a str, stages: &'a [Stage])
        -> StoreFuture<'a, Vec<Value>>;
}

/// A caller-supplied starting query: a collection plus a scope filter
/// that the builder narrows further and never widens.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseQuery {
    pub collection: String,
    pub filter: Condition,
}

impl BaseQuery {
    /// Every document of `collection`
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: Condition::always(),
        }
    }

    /// Narrow the scope with an additional condition
    pub fn scoped(mut self, condition: Condition) -> Self {
        self.filter = std::mem::replace(&mut self.filter, Condition::always()).and(condition);
        self
    }
}

/// A fully assembled find request
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub collection: String,
    pub filter: Condition,
    pub sort: Option<SortSpec>,
    pub skip: u64,
    pub limit: Option<u64>,
}
