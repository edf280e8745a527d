//! # In-Memory Store
//!
//! A `DocumentStore` over named collections of JSON documents held behind
//! a lock. Documents keep insertion order, which is the order an unsorted
//! find returns them in.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::pipeline::{self, ID_FIELD};
use super::{DocumentStore, FindQuery, StoreFuture};
use crate::query::sort::CREATED_AT_FIELD;
use crate::query::{Condition, Stage};

type Collections = HashMap<String, Vec<Value>>;

/// Shared, thread-safe in-memory document store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object mapping collection names to arrays
    /// of documents
    pub fn from_seed(seed: &Value) -> StoreResult<Self> {
        let store = Self::new();
        let Value::Object(collections) = seed else {
            return Err(StoreError::Seed(
                "seed must be an object of collections".into(),
            ));
        };
        for (name, docs) in collections {
            let Value::Array(docs) = docs else {
                return Err(StoreError::Seed(format!(
                    "collection '{}' must be an array",
                    name
                )));
            };
            store.insert_many(name, docs.iter().cloned())?;
        }
        Ok(store)
    }

    /// Load seed data from a JSON file
    pub fn load_seed_file(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let seed: Value = serde_json::from_str(&content)?;
        let store = Self::from_seed(&seed)?;
        debug!(path = %path.display(), documents = store.len(), "seed file loaded");
        Ok(store)
    }

    /// Insert one document, stamping `_id` and `createdAt` when absent.
    ///
    /// Returns the stored document.
    pub fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value> {
        let doc = stamp(doc)?;
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    /// Insert several documents under one lock
    pub fn insert_many<I>(&self, collection: &str, docs: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = Value>,
    {
        let stamped = docs.into_iter().map(stamp).collect::<StoreResult<Vec<_>>>()?;
        let count = stamped.len();
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .extend(stamped);
        Ok(count)
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> StoreResult<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Total number of documents across collections
    pub fn len(&self) -> usize {
        self.read()
            .map(|c| c.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self, collection: &str) -> StoreResult<Vec<Value>> {
        Ok(self.read()?.get(collection).cloned().unwrap_or_default())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("collection lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("collection lock poisoned".into()))
    }
}

fn stamp(doc: Value) -> StoreResult<Value> {
    let Value::Object(mut map) = doc else {
        return Err(StoreError::Seed("documents must be JSON objects".into()));
    };
    if !map.contains_key(ID_FIELD) {
        map.insert(ID_FIELD.into(), Value::String(Uuid::new_v4().to_string()));
    }
    if !map.contains_key(CREATED_AT_FIELD) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        map.insert(CREATED_AT_FIELD.into(), Value::String(now));
    }
    Ok(Value::Object(map))
}

impl DocumentStore for InMemoryStore {
    fn find<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let guard = self.read()?;
            let mut docs: Vec<Value> = guard
                .get(&query.collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|d| query.filter.matches(d))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            drop(guard);

            if let Some(sort) = &query.sort {
                sort.sort(&mut docs);
            }
            let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
            let limit = query
                .limit
                .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
            Ok(docs.into_iter().skip(skip).take(limit).collect())
        })
    }

    fn count<'a>(&'a self, collection: &'a str, filter: &'a Condition) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let guard = self.read()?;
            let count = guard
                .get(collection)
                .map_or(0, |docs| docs.iter().filter(|d| filter.matches(d)).count());
            Ok(count as u64)
        })
    }

    fn aggregate<'a>(
        &'a self,
        collection: &'a str,
        stages: &'a [Stage],
    ) -> StoreFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let docs = self.snapshot(collection)?;
            pipeline::run(docs, stages, &|name: &str| self.snapshot(name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortKey, SortSpec};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_insert_stamps_id_and_created_at() {
        let store = InMemoryStore::new();
        let doc = store.insert("users", json!({"name": "Ada"})).unwrap();
        assert!(doc[ID_FIELD].is_string());
        assert!(doc[CREATED_AT_FIELD].is_string());
    }

    #[test]
    fn test_insert_keeps_existing_stamps() {
        let store = InMemoryStore::new();
        let doc = store
            .insert("users", json!({"_id": "u1", "createdAt": "2024-01-01T00:00:00Z"}))
            .unwrap();
        assert_eq!(doc[ID_FIELD], json!("u1"));
        assert_eq!(doc[CREATED_AT_FIELD], json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_insert_rejects_non_object() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.insert("users", json!(3)),
            Err(StoreError::Seed(_))
        ));
    }

    #[test]
    fn test_from_seed_rejects_bad_shape() {
        assert!(InMemoryStore::from_seed(&json!([])).is_err());
        assert!(InMemoryStore::from_seed(&json!({"users": {}})).is_err());
    }

    #[test]
    fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"users": [{{"name": "a"}}, {{"name": "b"}}], "schools": []}}"#).unwrap();
        let store = InMemoryStore::load_seed_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.collection_names().unwrap(), vec!["schools", "users"]);
    }

    #[tokio::test]
    async fn test_find_filters_sorts_and_windows() {
        let store = InMemoryStore::new();
        for n in 1..=6 {
            store
                .insert("items", json!({"n": n, "even": n % 2 == 0}))
                .unwrap();
        }
        let query = FindQuery {
            collection: "items".into(),
            filter: Condition::eq("even", json!(true)),
            sort: Some(SortSpec {
                keys: vec![SortKey::desc("n")],
            }),
            skip: 1,
            limit: Some(5),
        };
        let docs = store.find(&query).await.unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![4, 2]);
    }

    #[tokio::test]
    async fn test_count_unknown_collection_is_zero() {
        let store = InMemoryStore::new();
        assert_eq!(store.count("nope", &Condition::always()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_aggregate_reads_foreign_collection() {
        let store = InMemoryStore::new();
        store.insert("users", json!({"_id": "u1", "name": "Ada"})).unwrap();
        store
            .insert("schools", json!({"userId": "u1", "schoolName": "Riverside"}))
            .unwrap();
        let stages = vec![
            Stage::Lookup(crate::query::stage::Lookup::new(
                "schools", "_id", "userId", "school",
            )),
            Stage::unwind("school"),
        ];
        let out = store.aggregate("users", &stages).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["school"]["schoolName"], json!("Riverside"));
    }
}
