//! # List Service
//!
//! Drives one fresh builder per request: search, filter, sort and paginate
//! are applied from the endpoint definition, then the page and the total
//! are read concurrently.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::endpoint::{Catalog, ListEndpoint};
use super::errors::{ListError, ListResult};
use crate::observability::Event;
use crate::query::{
    AggregationQueryBuilder, Condition, QueryBuilder, QueryParams, RawParams, ResultEnvelope, Stage,
};
use crate::store::{BaseQuery, DocumentStore};

/// Envelope type returned by every list endpoint
pub type ListEnvelope = ResultEnvelope<Value>;

/// Serves list requests against a store
#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<Catalog>,
}

impl ListService {
    pub fn new(store: Arc<dyn DocumentStore>, catalog: Catalog) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// List one page of `endpoint`.
    ///
    /// A blank tenant counts as none.
    pub async fn list(
        &self,
        endpoint: &str,
        tenant: Option<&str>,
        params: &RawParams,
    ) -> ListResult<ListEnvelope> {
        let outcome = self.run(endpoint, tenant, params).await;
        match &outcome {
            Ok(envelope) => info!(
                event = %Event::ListExecuted,
                endpoint,
                page = envelope.meta.page,
                limit = envelope.meta.limit,
                total = envelope.meta.total,
                returned = envelope.result.len(),
                "list served"
            ),
            Err(e) => warn!(
                event = %Event::ListFailed,
                endpoint,
                code = e.code(),
                error = %e,
                "list failed"
            ),
        }
        outcome
    }

    async fn run(
        &self,
        name: &str,
        tenant: Option<&str>,
        params: &RawParams,
    ) -> ListResult<ListEnvelope> {
        let endpoint = self
            .catalog
            .get(name)
            .ok_or_else(|| ListError::UnknownEndpoint(name.to_string()))?;
        let scope = scope_condition(endpoint, tenant)?;
        let params = QueryParams::parse(params);

        match &endpoint.pipeline {
            Some(stages) => self.run_aggregation(endpoint, stages, scope, params).await,
            None => self.run_find(endpoint, scope, params).await,
        }
    }

    async fn run_find(
        &self,
        endpoint: &ListEndpoint,
        scope: Option<Condition>,
        params: QueryParams,
    ) -> ListResult<ListEnvelope> {
        let mut base = BaseQuery::collection(&endpoint.collection);
        if let Some(scope) = scope {
            base = base.scoped(scope);
        }

        let mut builder = QueryBuilder::with_params(self.store.as_ref(), base, params)
            .with_default_limit(endpoint.default_limit)
            .with_max_limit(endpoint.max_limit);
        builder
            .search(&endpoint.search_field_refs())
            .filter(&endpoint.filter_field_refs())
            .sort()
            .paginate();

        let (result, total) = tokio::try_join!(builder.execute(), builder.count_total())?;
        Ok(ResultEnvelope::new(builder.meta(total), result))
    }

    async fn run_aggregation(
        &self,
        endpoint: &ListEndpoint,
        stages: &[Stage],
        scope: Option<Condition>,
        params: QueryParams,
    ) -> ListResult<ListEnvelope> {
        let mut custom = Vec::with_capacity(stages.len() + 1);
        if let Some(scope) = scope {
            custom.push(Stage::Match(scope));
        }
        custom.extend(stages.iter().cloned());

        let mut builder = AggregationQueryBuilder::with_params(self.store.as_ref(), params)
            .with_default_limit(endpoint.default_limit)
            .with_max_limit(endpoint.max_limit);
        builder
            .custom_pipeline(custom)
            .search(&endpoint.search_field_refs())
            .filter(&endpoint.filter_field_refs())
            .sort()
            .paginate();

        let collection = endpoint.collection.as_str();
        let (result, total) = tokio::try_join!(
            builder.execute(collection),
            builder.count_total(collection)
        )?;
        Ok(ResultEnvelope::new(builder.meta(total), result))
    }
}

fn scope_condition(endpoint: &ListEndpoint, tenant: Option<&str>) -> ListResult<Option<Condition>> {
    let Some(field) = &endpoint.scope_field else {
        return Ok(None);
    };
    match tenant.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tenant) => Ok(Some(Condition::eq(field.clone(), Value::String(tenant.to_string())))),
        None => Err(ListError::MissingTenant(endpoint.name.clone())),
    }
}
