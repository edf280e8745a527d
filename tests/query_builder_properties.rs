//! Query Builder Property Tests
//!
//! Behavioral properties of the simple query builder:
//! - Page windows are exact slices of the filtered, sorted set
//! - Totals ignore the page window
//! - Malformed paging input falls back to defaults
//! - Search is an OR across fields; filters honor the allow-list
//! - Multi-key sorts break ties deterministically
//! - Store failures surface unchanged

use serde_json::{json, Value};

use schooldesk::query::{
    Condition, Meta, QueryBuilder, RawParams, ResultEnvelope, Stage,
};
use schooldesk::store::{
    BaseQuery, DocumentStore, FindQuery, InMemoryStore, StoreError, StoreFuture,
};

// =============================================================================
// Fixtures
// =============================================================================

/// 23 members: 15 active, 4 active names containing "jo", 2 inactive ones.
fn members() -> InMemoryStore {
    let store = InMemoryStore::new();
    for i in 0..23 {
        let name = match i {
            1 => "John".to_string(),
            4 => "Jolene".to_string(),
            8 => "Major Tom".to_string(),
            12 => "banjo".to_string(),
            16 => "Joseph".to_string(),
            20 => "Jody".to_string(),
            n => format!("Member {}", n),
        };
        let status = if i < 15 { "active" } else { "inactive" };
        store
            .insert(
                "members",
                json!({
                    "_id": format!("m{}", i),
                    "name": name,
                    "email": format!("user{}@example.org", i),
                    "status": status,
                    "age": 20 + (i % 5),
                    "createdAt": format!("2024-01-{:02}T00:00:00Z", i + 1),
                }),
            )
            .unwrap();
    }
    store
}

fn ids(docs: &[Value]) -> Vec<&str> {
    docs.iter().map(|d| d["_id"].as_str().unwrap()).collect()
}

async fn envelope(store: &InMemoryStore, raw: &RawParams) -> ResultEnvelope<Value> {
    let mut builder = QueryBuilder::new(store, BaseQuery::collection("members"), raw);
    builder
        .search(&["name"])
        .filter(&["status"])
        .sort()
        .paginate();
    let (result, total) = tokio::try_join!(builder.execute(), builder.count_total()).unwrap();
    ResultEnvelope::new(builder.meta(total), result)
}

// =============================================================================
// Pagination
// =============================================================================

/// Every window is the matching slice of the full ordered set.
#[tokio::test]
async fn test_page_window_is_exact_slice() {
    let store = members();

    let mut all = QueryBuilder::new(&store, BaseQuery::collection("members"), &RawParams::new());
    all.sort();
    let full = all.execute().await.unwrap();
    assert_eq!(full.len(), 23);

    for limit in 1..=5usize {
        for page in 1..=7usize {
            let raw = RawParams::new()
                .with("page", page.to_string())
                .with("limit", limit.to_string());
            let mut builder = QueryBuilder::new(&store, BaseQuery::collection("members"), &raw);
            builder.sort().paginate();
            let window = builder.execute().await.unwrap();

            let start = ((page - 1) * limit).min(full.len());
            let end = (page * limit).min(full.len());
            assert!(window.len() <= limit);
            assert_eq!(window, full[start..end].to_vec(), "page={} limit={}", page, limit);
        }
    }
}

/// Total is the same on every page.
#[tokio::test]
async fn test_total_independent_of_page() {
    let store = members();
    let mut totals = Vec::new();
    for page in ["1", "3", "9"] {
        let raw = RawParams::new()
            .with("status", "active")
            .with("page", page)
            .with("limit", "5");
        totals.push(envelope(&store, &raw).await.meta.total);
    }
    assert_eq!(totals, vec![15, 15, 15]);
}

/// Missing or unreadable paging input never errors.
#[tokio::test]
async fn test_paging_defaults() {
    let store = members();
    for raw in [
        RawParams::new(),
        RawParams::new().with("page", "abc").with("limit", "ten"),
        RawParams::new().with("page", "").with("limit", json!(null)),
    ] {
        let result = envelope(&store, &raw).await;
        assert_eq!(result.meta.page, 1);
        assert_eq!(result.meta.limit, 10);
        assert_eq!(result.result.len(), 10);
    }
}

#[tokio::test]
async fn test_caller_default_limit() {
    let store = members();
    let mut builder =
        QueryBuilder::new(&store, BaseQuery::collection("members"), &RawParams::new())
            .with_default_limit(4);
    builder.paginate();
    assert_eq!(builder.execute().await.unwrap().len(), 4);
    assert_eq!(builder.meta(23), Meta::new(1, 4, 23));
}

#[test]
fn test_total_page_arithmetic() {
    assert_eq!(Meta::new(1, 10, 21).total_page, 3);
    assert_eq!(Meta::new(1, 10, 20).total_page, 2);
    assert_eq!(Meta::new(1, 10, 0).total_page, 0);
    assert_eq!(Meta::new(1, 1, 1).total_page, 1);
}

#[test]
fn test_meta_wire_shape() {
    let value = serde_json::to_value(Meta::new(2, 2, 4)).unwrap();
    assert_eq!(value, json!({"page": 2, "limit": 2, "total": 4, "totalPage": 2}));
}

// =============================================================================
// Search and Filter
// =============================================================================

/// A document matches when either field contains the term.
#[tokio::test]
async fn test_search_or_across_fields() {
    let store = InMemoryStore::new();
    store.insert("people", json!({"_id": "a", "name": "Alice", "email": "a@x.io"})).unwrap();
    store.insert("people", json!({"_id": "b", "name": "Bob", "email": "alice.b@x.io"})).unwrap();
    store.insert("people", json!({"_id": "c", "name": "Carl", "email": "c@x.io"})).unwrap();

    let raw = RawParams::new().with("searchTerm", "ALIce");
    let mut builder = QueryBuilder::new(&store, BaseQuery::collection("people"), &raw);
    builder.search(&["name", "email"]);

    let mut found = ids(&builder.execute().await.unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    found.sort();
    assert_eq!(found, vec!["a", "b"]);
    assert_eq!(builder.count_total().await.unwrap(), 2);
}

/// Search input is matched literally.
#[tokio::test]
async fn test_search_term_is_not_a_pattern() {
    let store = InMemoryStore::new();
    store.insert("notes", json!({"title": "a.c"})).unwrap();
    store.insert("notes", json!({"title": "abc"})).unwrap();

    let raw = RawParams::new().with("searchTerm", "a.c");
    let mut builder = QueryBuilder::new(&store, BaseQuery::collection("notes"), &raw);
    builder.search(&["title"]);
    assert_eq!(builder.count_total().await.unwrap(), 1);
}

/// Parameters outside the allow-list never constrain results.
#[tokio::test]
async fn test_filter_allow_list() {
    let store = members();
    let raw = RawParams::new().with("status", "inactive").with("email", "nobody");

    let mut listed = QueryBuilder::new(&store, BaseQuery::collection("members"), &raw);
    listed.filter(&["status"]);
    assert_eq!(listed.count_total().await.unwrap(), 8);

    let mut unlisted = QueryBuilder::new(&store, BaseQuery::collection("members"), &raw);
    unlisted.filter(&["age", "page"]);
    assert_eq!(unlisted.count_total().await.unwrap(), 23);
}

/// Repeated parameters match any of their values.
#[tokio::test]
async fn test_repeated_filter_parameter() {
    let store = members();
    let raw = RawParams::from_pairs(vec![("age", "20"), ("age", "21")]);
    let mut builder = QueryBuilder::new(&store, BaseQuery::collection("members"), &raw);
    builder.filter(&["age"]);
    // ages cycle 20..=24 over 23 documents
    assert_eq!(builder.count_total().await.unwrap(), 10);
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn test_sort_tie_break() {
    let store = InMemoryStore::new();
    for (id, age, name) in [
        ("1", 30, "Zed"),
        ("2", 40, "Amy"),
        ("3", 30, "Bea"),
        ("4", 40, "Cal"),
        ("5", 30, "Abe"),
    ] {
        store
            .insert("people", json!({"_id": id, "age": age, "name": name}))
            .unwrap();
    }

    let raw = RawParams::new().with("sort", "-age,name");
    let mut builder = QueryBuilder::new(&store, BaseQuery::collection("people"), &raw);
    builder.sort();
    let result = builder.execute().await.unwrap();
    assert_eq!(ids(&result), vec!["2", "4", "5", "3", "1"]);
}

#[tokio::test]
async fn test_default_sort_is_newest_first() {
    let store = members();
    let raw = RawParams::new().with("sort", " , ");
    let mut builder = QueryBuilder::new(&store, BaseQuery::collection("members"), &raw);
    builder.sort().paginate();
    let result = builder.execute().await.unwrap();
    assert_eq!(result[0]["_id"], json!("m22"));
}

// =============================================================================
// End to End
// =============================================================================

#[tokio::test]
async fn test_filter_search_page_scenario() {
    let store = members();

    let raw = RawParams::new().with("status", "active");
    let mut active = QueryBuilder::new(&store, BaseQuery::collection("members"), &raw);
    active.filter(&["status"]);
    assert_eq!(active.count_total().await.unwrap(), 15);

    let raw = RawParams::new()
        .with("status", "active")
        .with("searchTerm", "jo")
        .with("page", "2")
        .with("limit", "2");
    let result = envelope(&store, &raw).await;

    assert_eq!(result.result.len(), 2);
    assert_eq!(result.meta, Meta::new(2, 2, 4));
    assert_eq!(result.meta.total_page, 2);
    // matches newest first: m12, m8, m4, m1
    assert_eq!(ids(&result.result), vec!["m4", "m1"]);
}

// =============================================================================
// Failure Propagation
// =============================================================================

struct UnavailableStore;

impl DocumentStore for UnavailableStore {
    fn find<'a>(&'a self, _query: &'a FindQuery) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async { Err(StoreError::Unavailable("connection refused".into())) })
    }

    fn count<'a>(&'a self, _collection: &'a str, _filter: &'a Condition) -> StoreFuture<'a, u64> {
        Box::pin(async { Err(StoreError::Unavailable("connection refused".into())) })
    }

    fn aggregate<'a>(
        &'a self,
        _collection: &'a str,
        _stages: &'a [Stage],
    ) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async { Err(StoreError::Unavailable("connection refused".into())) })
    }
}

#[tokio::test]
async fn test_store_failure_surfaces_unchanged() {
    let store = UnavailableStore;
    let mut builder = QueryBuilder::new(&store, BaseQuery::collection("members"), &RawParams::new());
    builder.sort().paginate();

    match builder.execute().await {
        Err(StoreError::Unavailable(message)) => assert_eq!(message, "connection refused"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        builder.count_total().await,
        Err(StoreError::Unavailable(_))
    ));
}
