//! Generic document operations by [`StatePath`]
//!
//! Object key order is preserved: removals use `shift_remove` so siblings keep
//! their relative positions when the document is written back.

use serde_json::{Map, Value};

use crate::error::StateError;
use crate::path::{Segment, StatePath};

/// Look up the value at `path`
#[inline]
#[must_use]
pub fn get_at<'a>(doc: &'a Value, path: &StatePath) -> Option<&'a Value> {
    path.resolve(doc)
}

/// Look up the value at `path` mutably
#[inline]
pub fn get_at_mut<'a>(doc: &'a mut Value, path: &StatePath) -> Option<&'a mut Value> {
    path.resolve_mut(doc)
}

/// Write `value` at `path`, returning the previous value if any
///
/// Missing object members along the way are created as empty objects. Array
/// indices are never created: an out-of-range index is [`StateError::PathNotFound`].
///
/// # Errors
///
/// Returns [`StateError::NotAnObject`] when an intermediate value is a scalar
/// and [`StateError::PathNotFound`] for a missing array element or an empty path.
pub fn set_at(doc: &mut Value, path: &StatePath, value: Value) -> Result<Option<Value>, StateError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(StateError::PathNotFound(path.clone()));
    };

    let mut current = doc;
    let mut walked = StatePath::root();
    for segment in parents {
        current = step_or_create(current, segment, &walked)?;
        walked = match segment {
            Segment::Key(key) => walked.child(key.clone()),
            Segment::Index(index) => walked.index(*index),
        };
    }

    match (last, current) {
        (Segment::Key(key), Value::Object(map)) => Ok(map.insert(key.clone(), value)),
        (Segment::Index(index), Value::Array(items)) => match items.get_mut(*index) {
            Some(slot) => Ok(Some(std::mem::replace(slot, value))),
            None => Err(StateError::PathNotFound(path.clone())),
        },
        (_, other) => Err(StateError::not_an_object(&walked, other)),
    }
}

fn step_or_create<'a>(
    current: &'a mut Value,
    segment: &Segment,
    walked: &StatePath,
) -> Result<&'a mut Value, StateError> {
    match segment {
        Segment::Key(key) => match current {
            Value::Object(map) => Ok(map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()))),
            other => Err(StateError::not_an_object(walked, other)),
        },
        Segment::Index(index) => match current {
            Value::Array(items) => items
                .get_mut(*index)
                .ok_or_else(|| StateError::PathNotFound(walked.index(*index))),
            other => Err(StateError::unexpected_type(walked, "array", other)),
        },
    }
}

/// Remove the value at `path`, returning it
///
/// Absence anywhere along the path is not an error.
pub fn delete_at(doc: &mut Value, path: &StatePath) -> Option<Value> {
    let (last, parent) = path.segments().split_last()?;
    let parent = StatePath::new(parent.to_vec()).resolve_mut(doc)?;
    match (last, parent) {
        (Segment::Key(key), Value::Object(map)) => map.shift_remove(key),
        (Segment::Index(index), Value::Array(items)) if *index < items.len() => {
            Some(items.remove(*index))
        }
        _ => None,
    }
}

/// Remove several elements from an array by their original indices
///
/// Indices are de-duplicated and applied highest first so that earlier
/// deletions never shift the targets of later ones. Out-of-range indices are
/// ignored. Returns the number of elements removed.
pub fn remove_indices(items: &mut Vec<Value>, indices: &[usize]) -> usize {
    let mut ordered = indices.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered.dedup();

    let mut removed = 0;
    for index in ordered {
        if index < items.len() {
            items.remove(index);
            removed += 1;
        }
    }
    removed
}

/// Set `schema_version` on an instance object
///
/// # Errors
///
/// Returns [`StateError::NotAnObject`] if the instance is not a JSON object.
pub fn stamp_schema_version(instance: &mut Value, version: u64) -> Result<(), StateError> {
    match instance {
        Value::Object(map) => {
            map.insert("schema_version".to_string(), Value::from(version));
            Ok(())
        }
        other => Err(StateError::not_an_object(&StatePath::root(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_at_creates_intermediate_objects() {
        let mut doc = json!({});
        let path: StatePath = "attributes.settings.ipv4_only".parse().unwrap();
        let previous = set_at(&mut doc, &path, json!(true)).unwrap();
        assert!(previous.is_none());
        assert_eq!(doc, json!({"attributes": {"settings": {"ipv4_only": true}}}));
    }

    #[test]
    fn set_at_replaces_array_element() {
        let mut doc = json!({"instances": [{"a": 1}, {"a": 2}]});
        let path = StatePath::key("instances").index(1);
        let previous = set_at(&mut doc, &path, json!({"a": 3})).unwrap();
        assert_eq!(previous, Some(json!({"a": 2})));
        assert_eq!(doc["instances"][1], json!({"a": 3}));
    }

    #[test]
    fn set_at_missing_index() {
        let mut doc = json!({"instances": []});
        let path = StatePath::key("instances").index(0).child("x");
        assert!(matches!(
            set_at(&mut doc, &path, json!(1)),
            Err(StateError::PathNotFound(_))
        ));
    }

    #[test]
    fn set_at_through_scalar() {
        let mut doc = json!({"attributes": "oops"});
        let path = StatePath::key("attributes").child("ttl");
        assert!(matches!(
            set_at(&mut doc, &path, json!(1)),
            Err(StateError::NotAnObject { .. })
        ));
    }

    #[test]
    fn delete_at_preserves_sibling_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(delete_at(&mut doc, &StatePath::key("a")), Some(json!(1)));
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn delete_at_absent_is_none() {
        let mut doc = json!({"a": {}});
        assert_eq!(delete_at(&mut doc, &"a.b.c".parse().unwrap()), None);
        assert_eq!(delete_at(&mut doc, &StatePath::root()), None);
    }

    #[test]
    fn remove_indices_highest_first() {
        let mut items = vec![json!("r0"), json!("d1"), json!("r2"), json!("d3"), json!("d4")];
        let removed = remove_indices(&mut items, &[1, 3, 4]);
        assert_eq!(removed, 3);
        assert_eq!(items, vec![json!("r0"), json!("r2")]);
    }

    #[test]
    fn remove_indices_duplicates_and_out_of_range() {
        let mut items = vec![json!(0), json!(1), json!(2)];
        let removed = remove_indices(&mut items, &[0, 0, 9]);
        assert_eq!(removed, 1);
        assert_eq!(items, vec![json!(1), json!(2)]);
    }

    #[test]
    fn stamp_schema_version_sets_number() {
        let mut instance = json!({"attributes": {}, "schema_version": 3});
        stamp_schema_version(&mut instance, 0).unwrap();
        assert_eq!(instance["schema_version"], json!(0));
        assert!(stamp_schema_version(&mut json!([]), 0).is_err());
    }
}
