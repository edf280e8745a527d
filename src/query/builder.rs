//! # Simple Query Builder
//!
//! Narrows a caller's base query with search, filter, sort and paging
//! derived from request parameters. Composition calls only record state;
//! `execute` and `count_total` each assemble their own store request from
//! that state, so the count never sees the sort or the page window.
//!
//! ```ignore
//! let mut builder = QueryBuilder::new(&store, base, &raw);
//! builder.search(&["name", "email"]).filter(&["status"]).sort().paginate();
//! let (result, total) = tokio::try_join!(builder.execute(), builder.count_total())?;
//! let envelope = ResultEnvelope::new(builder.meta(total), result);
//! ```

use serde_json::Value;
use tracing::debug;

use super::condition::Condition;
use super::filter::FilterDescriptor;
use super::pagination::{Meta, Pagination, DEFAULT_LIMIT};
use super::params::{QueryParams, RawParams};
use super::search::SearchDescriptor;
use super::sort::SortSpec;
use crate::store::{BaseQuery, DocumentStore, FindQuery, StoreResult};

/// Accumulated composition state shared by both builders
#[derive(Debug, Clone)]
pub(crate) struct Composition {
    params: QueryParams,
    default_limit: u64,
    max_limit: Option<u64>,
    search: Option<SearchDescriptor>,
    filter: FilterDescriptor,
    sort: Option<SortSpec>,
    paginated: bool,
}

impl Composition {
    pub(crate) fn new(params: QueryParams) -> Self {
        Self {
            params,
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
            search: None,
            filter: FilterDescriptor::default(),
            sort: None,
            paginated: false,
        }
    }

    pub(crate) fn set_default_limit(&mut self, limit: u64) {
        self.default_limit = limit.max(1);
    }

    pub(crate) fn set_max_limit(&mut self, limit: Option<u64>) {
        self.max_limit = limit;
    }

    /// A later call replaces an earlier one
    pub(crate) fn search(&mut self, fields: &[&str]) {
        self.search = SearchDescriptor::from_params(&self.params, fields);
    }

    /// A later call replaces an earlier one
    pub(crate) fn filter(&mut self, allowed: &[&str]) {
        self.filter = FilterDescriptor::from_params(&self.params, allowed);
    }

    pub(crate) fn sort(&mut self) {
        self.sort = Some(SortSpec::parse(self.params.sort.as_deref()));
    }

    pub(crate) fn paginate(&mut self) {
        self.paginated = true;
    }

    /// Search and filter constraints as one condition, `None` if neither
    /// was applied
    pub(crate) fn matching(&self) -> Option<Condition> {
        let mut parts = Vec::new();
        if let Some(search) = &self.search {
            parts.push(search.to_condition());
        }
        if let Some(filter) = self.filter.to_condition() {
            parts.push(filter);
        }
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Condition::All(parts)),
        }
    }

    pub(crate) fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// The page window, present only after `paginate`
    pub(crate) fn window(&self) -> Option<Pagination> {
        self.paginated.then(|| self.pagination())
    }

    /// Resolved paging values, whether or not `paginate` was called
    pub(crate) fn pagination(&self) -> Pagination {
        Pagination::resolve(&self.params.pagination, self.default_limit, self.max_limit)
    }
}

/// Builder over a base query for one request
pub struct QueryBuilder<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    base: BaseQuery,
    composition: Composition,
}

impl<'s, S: DocumentStore + ?Sized> QueryBuilder<'s, S> {
    /// Create a builder from raw request parameters
    pub fn new(store: &'s S, base: BaseQuery, params: &RawParams) -> Self {
        Self::with_params(store, base, QueryParams::parse(params))
    }

    /// Create a builder from already normalized parameters
    pub fn with_params(store: &'s S, base: BaseQuery, params: QueryParams) -> Self {
        Self {
            store,
            base,
            composition: Composition::new(params),
        }
    }

    /// Page size used when the request gives none
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.composition.set_default_limit(limit);
        self
    }

    /// Upper bound on the requested page size
    pub fn with_max_limit(mut self, limit: Option<u64>) -> Self {
        self.composition.set_max_limit(limit);
        self
    }

    /// Match the search term as a case-insensitive substring of any field
    pub fn search(&mut self, fields: &[&str]) -> &mut Self {
        self.composition.search(fields);
        self
    }

    /// Equality constraints for allow-listed parameters present in the request
    pub fn filter(&mut self, allowed: &[&str]) -> &mut Self {
        self.composition.filter(allowed);
        self
    }

    /// Order by the request's sort string, or newest first
    pub fn sort(&mut self) -> &mut Self {
        self.composition.sort();
        self
    }

    /// Restrict results to the requested page
    pub fn paginate(&mut self) -> &mut Self {
        self.composition.paginate();
        self
    }

    /// Base scope narrowed by search and filter
    pub fn count_filter(&self) -> Condition {
        match self.composition.matching() {
            Some(condition) => self.base.filter.clone().and(condition),
            None => self.base.filter.clone(),
        }
    }

    /// The result read: constraints, sort and window
    pub fn find_query(&self) -> FindQuery {
        let window = self.composition.window();
        FindQuery {
            collection: self.base.collection.clone(),
            filter: self.count_filter(),
            sort: self.composition.sort_spec().cloned(),
            skip: window.map_or(0, |w| w.skip()),
            limit: window.map(|w| w.limit),
        }
    }

    /// Resolved page and limit
    pub fn pagination(&self) -> Pagination {
        self.composition.pagination()
    }

    /// Metadata for a total produced by `count_total`
    pub fn meta(&self, total: u64) -> Meta {
        self.pagination().meta(total)
    }

    /// Read the current page
    pub async fn execute(&self) -> StoreResult<Vec<Value>> {
        let query = self.find_query();
        debug!(
            collection = %query.collection,
            sorted = query.sort.is_some(),
            skip = query.skip,
            limit = ?query.limit,
            "find composed"
        );
        self.store.find(&query).await
    }

    /// Count every document matching search and filter, ignoring sort and
    /// paging
    pub async fn count_total(&self) -> StoreResult<u64> {
        let filter = self.count_filter();
        debug!(collection = %self.base.collection, "count composed");
        self.store.count(&self.base.collection, &filter).await
    }
}
