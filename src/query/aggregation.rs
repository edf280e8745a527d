//! # Aggregation Query Builder
//!
//! The pipeline variant of the query builder. Callers start from their own
//! stages (joins, unwinds, projections); search and filter become a match
//! stage placed after them, so conditions may target joined fields.
//!
//! Results run `custom ++ [match] ++ [sort] ++ [skip, limit]`; the total
//! runs `custom ++ [match] ++ [count]`. Both lists are assembled from the
//! same composition state on demand.

use serde_json::Value;
use tracing::debug;

use super::builder::Composition;
use super::pagination::{Meta, Pagination};
use super::params::{QueryParams, RawParams};
use super::stage::Stage;
use crate::store::{DocumentStore, StoreResult};

/// Output field of the count stage
pub const TOTAL_FIELD: &str = "total";

/// Pipeline builder for one request
pub struct AggregationQueryBuilder<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    custom: Vec<Stage>,
    composition: Composition,
}

impl<'s, S: DocumentStore + ?Sized> AggregationQueryBuilder<'s, S> {
    /// Create a builder from raw request parameters
    pub fn new(store: &'s S, params: &RawParams) -> Self {
        Self::with_params(store, QueryParams::parse(params))
    }

    /// Create a builder from already normalized parameters
    pub fn with_params(store: &'s S, params: QueryParams) -> Self {
        Self {
            store,
            custom: Vec::new(),
            composition: Composition::new(params),
        }
    }

    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.composition.set_default_limit(limit);
        self
    }

    pub fn with_max_limit(mut self, limit: Option<u64>) -> Self {
        self.composition.set_max_limit(limit);
        self
    }

    /// Append caller stages; they always run before the builder's own
    pub fn custom_pipeline(&mut self, stages: Vec<Stage>) -> &mut Self {
        self.custom.extend(stages);
        self
    }

    pub fn search(&mut self, fields: &[&str]) -> &mut Self {
        self.composition.search(fields);
        self
    }

    pub fn filter(&mut self, allowed: &[&str]) -> &mut Self {
        self.composition.filter(allowed);
        self
    }

    pub fn sort(&mut self) -> &mut Self {
        self.composition.sort();
        self
    }

    pub fn paginate(&mut self) -> &mut Self {
        self.composition.paginate();
        self
    }

    /// Stages of the result read
    pub fn result_pipeline(&self) -> Vec<Stage> {
        let mut stages = self.matched_pipeline();
        if let Some(sort) = self.composition.sort_spec() {
            stages.push(Stage::Sort(sort.clone()));
        }
        if let Some(window) = self.composition.window() {
            stages.push(Stage::Skip(window.skip()));
            stages.push(Stage::Limit(window.limit));
        }
        stages
    }

    /// Stages of the total count
    pub fn count_pipeline(&self) -> Vec<Stage> {
        let mut stages = self.matched_pipeline();
        stages.push(Stage::Count(TOTAL_FIELD.to_string()));
        stages
    }

    fn matched_pipeline(&self) -> Vec<Stage> {
        let mut stages = self.custom.clone();
        if let Some(condition) = self.composition.matching() {
            stages.push(Stage::Match(condition));
        }
        stages
    }

    pub fn pagination(&self) -> Pagination {
        self.composition.pagination()
    }

    pub fn meta(&self, total: u64) -> Meta {
        self.pagination().meta(total)
    }

    /// Run the result pipeline against `collection`
    pub async fn execute(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let stages = self.result_pipeline();
        debug!(
            collection,
            custom = self.custom.len(),
            stages = stages.len(),
            "aggregation composed"
        );
        self.store.aggregate(collection, &stages).await
    }

    /// Run the count pipeline against `collection`; no output means zero
    pub async fn count_total(&self, collection: &str) -> StoreResult<u64> {
        let stages = self.count_pipeline();
        debug!(collection, stages = stages.len(), "aggregation count composed");
        let rows = self.store.aggregate(collection, &stages).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get(TOTAL_FIELD))
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }
}
