//! # Pipeline Execution
//!
//! Evaluates typed stages over an in-memory document stream. Joins read
//! foreign collections through a caller-supplied lookup function, so the
//! executor never touches store locks itself.

use serde_json::{Map, Value};

use super::errors::StoreResult;
use crate::query::path::{remove_value, set_value, value_at, values_at};
use crate::query::stage::{Lookup, ProjectField, Projection};
use crate::query::{Condition, SortSpec, Stage};

/// Identifier field kept by inclusive projections
pub const ID_FIELD: &str = "_id";

/// Run `stages` in order over `docs`.
///
/// `collection` returns every document of a named collection and backs
/// `Lookup` stages.
pub fn run<F>(mut docs: Vec<Value>, stages: &[Stage], collection: &F) -> StoreResult<Vec<Value>>
where
    F: Fn(&str) -> StoreResult<Vec<Value>>,
{
    for stage in stages {
        docs = match stage {
            Stage::Match(condition) => exec_match(docs, condition),
            Stage::Lookup(lookup) => exec_lookup(docs, lookup, collection)?,
            Stage::Unwind {
                path,
                preserve_null_and_empty,
            } => exec_unwind(docs, path, *preserve_null_and_empty),
            Stage::Project(fields) => exec_project(docs, fields),
            Stage::Sort(spec) => exec_sort(docs, spec),
            Stage::Skip(n) => exec_skip(docs, *n),
            Stage::Limit(n) => exec_limit(docs, *n),
            Stage::Count(field) => exec_count(docs, field),
        };
    }
    Ok(docs)
}

fn exec_match(docs: Vec<Value>, condition: &Condition) -> Vec<Value> {
    if condition.is_always() {
        return docs;
    }
    docs.into_iter().filter(|d| condition.matches(d)).collect()
}

fn exec_lookup<F>(docs: Vec<Value>, lookup: &Lookup, collection: &F) -> StoreResult<Vec<Value>>
where
    F: Fn(&str) -> StoreResult<Vec<Value>>,
{
    let foreign = collection(&lookup.from)?;
    let mut result = Vec::with_capacity(docs.len());
    for mut doc in docs {
        let local = value_at(&doc, &lookup.local_field)
            .cloned()
            .unwrap_or(Value::Null);
        let join = Condition::eq(lookup.foreign_field.clone(), local);
        let joined: Vec<Value> = foreign.iter().filter(|f| join.matches(f)).cloned().collect();
        set_value(&mut doc, &lookup.as_field, Value::Array(joined));
        result.push(doc);
    }
    Ok(result)
}

fn exec_unwind(docs: Vec<Value>, path: &str, preserve: bool) -> Vec<Value> {
    let mut result = Vec::new();
    for doc in docs {
        match value_at(&doc, path).cloned() {
            Some(Value::Array(items)) if items.is_empty() => {
                if preserve {
                    let mut doc = doc;
                    remove_value(&mut doc, path);
                    result.push(doc);
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    let mut unwound = doc.clone();
                    set_value(&mut unwound, path, item);
                    result.push(unwound);
                }
            }
            None | Some(Value::Null) => {
                if preserve {
                    result.push(doc);
                }
            }
            Some(_) => result.push(doc),
        }
    }
    result
}

fn exec_project(docs: Vec<Value>, fields: &[ProjectField]) -> Vec<Value> {
    let inclusive = fields
        .iter()
        .any(|f| !matches!(f.projection, Projection::Exclude));

    docs.into_iter()
        .map(|doc| {
            if inclusive {
                project_inclusive(&doc, fields)
            } else {
                let mut doc = doc;
                for f in fields {
                    remove_value(&mut doc, &f.field);
                }
                doc
            }
        })
        .collect()
}

fn project_inclusive(doc: &Value, fields: &[ProjectField]) -> Value {
    let mut out = Value::Object(Map::new());
    let id_excluded = fields
        .iter()
        .any(|f| f.field == ID_FIELD && f.projection == Projection::Exclude);
    if !id_excluded {
        if let Some(id) = value_at(doc, ID_FIELD) {
            set_value(&mut out, ID_FIELD, id.clone());
        }
    }

    for f in fields {
        let value = match &f.projection {
            Projection::Exclude => continue,
            Projection::Include => value_at(doc, &f.field).cloned(),
            Projection::Path(source) => resolve_path(doc, source),
            Projection::Size(source) => {
                let len = value_at(doc, source)
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                Some(Value::from(len))
            }
            Projection::Literal(value) => Some(value.clone()),
        };
        if let Some(value) = value {
            set_value(&mut out, &f.field, value);
        }
    }
    out
}

/// A path through arrays yields an array of the values found
fn resolve_path(doc: &Value, source: &str) -> Option<Value> {
    if let Some(v) = value_at(doc, source) {
        return Some(v.clone());
    }
    let found = values_at(doc, source);
    if found.is_empty() {
        None
    } else {
        Some(Value::Array(found.into_iter().cloned().collect()))
    }
}

fn exec_sort(mut docs: Vec<Value>, spec: &SortSpec) -> Vec<Value> {
    spec.sort(&mut docs);
    docs
}

fn exec_skip(docs: Vec<Value>, n: u64) -> Vec<Value> {
    docs.into_iter().skip(clamp_usize(n)).collect()
}

fn exec_limit(docs: Vec<Value>, n: u64) -> Vec<Value> {
    docs.into_iter().take(clamp_usize(n)).collect()
}

/// An empty stream counts to no document at all
fn exec_count(docs: Vec<Value>, field: &str) -> Vec<Value> {
    if docs.is_empty() {
        return Vec::new();
    }
    let mut out = Map::new();
    out.insert(field.to_string(), Value::from(docs.len() as u64));
    vec![Value::Object(out)]
}

fn clamp_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortKey;
    use crate::store::StoreError;
    use serde_json::json;

    fn no_collections(_: &str) -> StoreResult<Vec<Value>> {
        Ok(Vec::new())
    }

    fn schools(name: &str) -> StoreResult<Vec<Value>> {
        match name {
            "schools" => Ok(vec![
                json!({"_id": "sc1", "userId": "u1", "schoolName": "Riverside"}),
                json!({"_id": "sc2", "userId": "u2", "schoolName": "Hillcrest"}),
            ]),
            _ => Ok(Vec::new()),
        }
    }

    #[test]
    fn test_lookup_and_unwind() {
        let users = vec![
            json!({"_id": "u1", "name": "Ada"}),
            json!({"_id": "u2", "name": "Bo"}),
            json!({"_id": "u3", "name": "Cy"}),
        ];
        let stages = vec![
            Stage::Lookup(Lookup::new("schools", "_id", "userId", "school")),
            Stage::unwind("school"),
        ];
        let out = run(users, &stages, &schools).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["school"]["schoolName"], json!("Riverside"));
        assert_eq!(out[1]["school"]["schoolName"], json!("Hillcrest"));
    }

    #[test]
    fn test_unwind_preserving_keeps_unmatched() {
        let users = vec![json!({"_id": "u3", "name": "Cy"})];
        let stages = vec![
            Stage::Lookup(Lookup::new("schools", "_id", "userId", "school")),
            Stage::unwind_preserving("school"),
        ];
        let out = run(users, &stages, &schools).unwrap();
        assert_eq!(out, vec![json!({"_id": "u3", "name": "Cy"})]);
    }

    #[test]
    fn test_lookup_error_propagates() {
        let failing = |_: &str| -> StoreResult<Vec<Value>> {
            Err(StoreError::Unavailable("down".into()))
        };
        let stages = vec![Stage::Lookup(Lookup::new("schools", "_id", "userId", "s"))];
        let err = run(vec![json!({"_id": 1})], &stages, &failing).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_inclusive_projection_keeps_id() {
        let docs = vec![json!({
            "_id": "t1",
            "name": "Ana",
            "secret": "x",
            "subjects": ["math", "art"],
            "user": {"email": "ana@x.io"}
        })];
        let stages = vec![Stage::Project(vec![
            ProjectField::include("name"),
            ProjectField::path("email", "user.email"),
            ProjectField::size("subjectCount", "subjects"),
            ProjectField::new("kind", Projection::Literal(json!("teacher"))),
        ])];
        let out = run(docs, &stages, &no_collections).unwrap();
        assert_eq!(
            out[0],
            json!({
                "_id": "t1",
                "name": "Ana",
                "email": "ana@x.io",
                "subjectCount": 2,
                "kind": "teacher"
            })
        );
    }

    #[test]
    fn test_exclusive_projection() {
        let docs = vec![json!({"_id": 1, "name": "a", "password": "p"})];
        let stages = vec![Stage::Project(vec![ProjectField::exclude("password")])];
        let out = run(docs, &stages, &no_collections).unwrap();
        assert_eq!(out[0], json!({"_id": 1, "name": "a"}));
    }

    #[test]
    fn test_sort_skip_limit() {
        let docs: Vec<Value> = (1..=5).map(|n| json!({"n": n})).collect();
        let stages = vec![
            Stage::Sort(SortSpec {
                keys: vec![SortKey::desc("n")],
            }),
            Stage::Skip(1),
            Stage::Limit(2),
        ];
        let out = run(docs, &stages, &no_collections).unwrap();
        assert_eq!(out, vec![json!({"n": 4}), json!({"n": 3})]);
    }

    #[test]
    fn test_count_stage() {
        let docs = vec![json!({"a": 1}), json!({"a": 2})];
        let out = run(docs, &[Stage::Count("total".into())], &no_collections).unwrap();
        assert_eq!(out, vec![json!({"total": 2})]);
    }

    #[test]
    fn test_count_of_nothing_is_empty() {
        let out = run(Vec::new(), &[Stage::Count("total".into())], &no_collections).unwrap();
        assert!(out.is_empty());
    }
}
