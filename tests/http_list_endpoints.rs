//! HTTP List Endpoint Tests
//!
//! Drives the axum router directly with `oneshot`:
//! - health and endpoint discovery
//! - query string to envelope, including repeated keys
//! - error status codes and `{ error, code }` bodies

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use schooldesk::http_server::{HttpServer, HttpServerConfig, TENANT_HEADER};
use schooldesk::listing::{Catalog, ListEndpoint, ListService};
use schooldesk::query::{Condition, Stage};
use schooldesk::store::{
    DocumentStore, FindQuery, InMemoryStore, StoreError, StoreFuture,
};

fn router_over(store: Arc<dyn DocumentStore>) -> Router {
    let catalog = Catalog::new(vec![
        ListEndpoint::new("announcements", "announcements")
            .scoped_by("schoolId")
            .searching(&["title"])
            .filtering(&["audience"]),
        ListEndpoint::new("levels", "levels").with_limits(2, Some(3)),
    ]);
    let service = ListService::new(store, catalog);
    HttpServer::new(HttpServerConfig::default(), service).router()
}

fn router() -> Router {
    let store = InMemoryStore::new();
    for i in 1..=5 {
        store
            .insert(
                "announcements",
                json!({
                    "schoolId": if i <= 4 { "s1" } else { "s2" },
                    "title": format!("Exam week {}", i),
                    "audience": if i % 2 == 0 { "parents" } else { "students" },
                    "createdAt": format!("2024-09-0{}T08:00:00Z", i),
                }),
            )
            .unwrap();
    }
    for i in 1..=7 {
        store.insert("levels", json!({"rank": i})).unwrap();
    }
    router_over(Arc::new(store))
}

async fn get(router: Router, uri: &str, tenant: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(tenant) = tenant {
        request = request.header(TENANT_HEADER, tenant);
    }
    let response = router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(router(), "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_endpoint_names() {
    let (status, body) = get(router(), "/api/v1/lists", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"endpoints": ["announcements", "levels"]}));
}

#[tokio::test]
async fn test_list_envelope() {
    let (status, body) = get(
        router(),
        "/api/v1/lists/announcements?searchTerm=exam&page=2&limit=3",
        Some("s1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"], json!({"page": 2, "limit": 3, "total": 4, "totalPage": 2}));
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
    assert_eq!(body["result"][0]["title"], json!("Exam week 1"));
}

#[tokio::test]
async fn test_repeated_query_keys_and_unlisted_keys() {
    let (status, body) = get(
        router(),
        "/api/v1/lists/announcements?audience=parents&audience=students&title=nothing",
        Some("s1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], json!(4));

    let (_, body) = get(
        router(),
        "/api/v1/lists/announcements?audience=parents",
        Some("s1"),
    )
    .await;
    assert_eq!(body["meta"]["total"], json!(2));
}

#[tokio::test]
async fn test_limit_defaults_and_clamp() {
    let (_, body) = get(router(), "/api/v1/lists/levels", None).await;
    assert_eq!(body["meta"], json!({"page": 1, "limit": 2, "total": 7, "totalPage": 4}));

    let (_, body) = get(router(), "/api/v1/lists/levels?limit=50&page=x", None).await;
    assert_eq!(body["meta"], json!({"page": 1, "limit": 3, "total": 7, "totalPage": 3}));
    assert_eq!(body["result"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_endpoint_is_404() {
    let (status, body) = get(router(), "/api/v1/lists/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Unknown list endpoint: nope", "code": 404}));
}

#[tokio::test]
async fn test_missing_tenant_is_400() {
    let (status, body) = get(router(), "/api/v1/lists/announcements", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));
}

struct BrokenStore;

impl DocumentStore for BrokenStore {
    fn find<'a>(&'a self, _query: &'a FindQuery) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async { Err(StoreError::Unavailable("disk offline".into())) })
    }

    fn count<'a>(&'a self, _collection: &'a str, _filter: &'a Condition) -> StoreFuture<'a, u64> {
        Box::pin(async { Err(StoreError::Unavailable("disk offline".into())) })
    }

    fn aggregate<'a>(
        &'a self,
        _collection: &'a str,
        _stages: &'a [Stage],
    ) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async { Err(StoreError::Unavailable("disk offline".into())) })
    }
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let (status, body) = get(router_over(Arc::new(BrokenStore)), "/api/v1/lists/levels", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Store unavailable: disk offline", "code": 500}));
}

#[tokio::test]
async fn test_list_routes_follow_base_path() {
    let store = InMemoryStore::new();
    store.insert("levels", json!({"rank": 1})).unwrap();
    let catalog = Catalog::new(vec![ListEndpoint::new("levels", "levels")]);
    let config = HttpServerConfig {
        base_path: "/school/v2".to_string(),
        ..Default::default()
    };
    let router = HttpServer::new(config, ListService::new(Arc::new(store), catalog)).router();

    let (status, body) = get(router.clone(), "/school/v2/lists/levels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], json!(1));

    let (status, _) = get(router.clone(), "/api/v1/lists/levels", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(router, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
