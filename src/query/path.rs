//! Dotted field paths over JSON documents
//!
//! `school.schoolName` walks nested objects. When a segment lands on an
//! array the walk fans out over every element, so a path can resolve to
//! several values.

use serde_json::Value;

/// Collects every value reachable at `path`.
///
/// Missing segments contribute nothing; an empty result means the field
/// is absent from the document.
pub fn values_at<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];

    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for value in current {
            collect_segment(value, segment, &mut next);
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

fn collect_segment<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(v) = map.get(segment) {
                out.push(v);
            }
        }
        Value::Array(items) => {
            // Numeric segments index directly, anything else fans out.
            if let Ok(index) = segment.parse::<usize>() {
                if let Some(v) = items.get(index) {
                    out.push(v);
                }
                return;
            }
            for item in items {
                collect_segment(item, segment, out);
            }
        }
        _ => {}
    }
}

/// Resolves a single value at `path`, without array fan-out.
///
/// Used where one value per document is needed (sort keys, projections).
pub fn value_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path`, creating intermediate objects as needed.
///
/// A non-object intermediate is replaced by an object.
pub fn set_value(doc: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

/// Removes the value at `path`, if any.
pub fn remove_value(doc: &mut Value, path: &str) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        current = match current {
            Value::Object(map) => match map.get_mut(*segment) {
                Some(v) => v,
                None => return,
            },
            _ => return,
        };
    }
    if let Value::Object(map) = current {
        map.remove(*last);
    }
}
