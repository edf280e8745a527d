//! List HTTP Routes
//!
//! - `GET /health`
//! - `GET /lists` - configured endpoint names
//! - `GET /lists/{endpoint}` - one page of an endpoint, tenant from the
//!   `x-tenant-id` header

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::errors::ApiResult;
use crate::listing::{ListEnvelope, ListService};
use crate::query::RawParams;

/// Header carrying the tenant (school or user) a request is scoped to
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Endpoint names response
#[derive(Debug, Serialize)]
pub struct EndpointsResponse {
    pub endpoints: Vec<String>,
}

/// Create list routes
pub fn list_routes(service: ListService) -> Router {
    Router::new()
        .route("/lists", get(endpoints_handler))
        .route("/lists/{endpoint}", get(list_handler))
        .with_state(service)
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn endpoints_handler(State(service): State<ListService>) -> Json<EndpointsResponse> {
    let endpoints = service
        .catalog()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(EndpointsResponse { endpoints })
}

/// Repeated query keys arrive as separate pairs and become arrays
async fn list_handler(
    State(service): State<ListService>,
    Path(endpoint): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> ApiResult<Json<ListEnvelope>> {
    let tenant = headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok());
    let params = RawParams::from_pairs(pairs);
    let envelope = service.list(&endpoint, tenant, &params).await?;
    Ok(Json(envelope))
}
