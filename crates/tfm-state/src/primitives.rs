//! Field-level state primitives
//!
//! Each function takes the document plus a [`StatePath`] to the object (or
//! field) it edits. Absence of the addressed value is never an error; finding
//! a non-object where an object is required is.

use serde_json::Value;

use crate::document::{delete_at, get_at, get_at_mut, set_at};
use crate::error::StateError;
use crate::path::StatePath;

/// Creation timestamp field
pub const CREATED_ON: &str = "created_on";

/// Last-modification timestamp field
pub const MODIFIED_ON: &str = "modified_on";

/// Insert `name = default` into the object at `path` unless the field exists
///
/// A field holding `null` counts as present. Returns `true` if inserted.
///
/// # Errors
///
/// Returns [`StateError::NotAnObject`] if `path` addresses a non-object.
pub fn ensure_field(
    doc: &mut Value,
    path: &StatePath,
    name: &str,
    default: Value,
) -> Result<bool, StateError> {
    let field = path.child(name);
    if get_at(doc, &field).is_some() {
        return Ok(false);
    }
    set_at(doc, &field, default)?;
    tracing::trace!(path = %field, "inserted default field");
    Ok(true)
}

/// Delete each listed field that exists on the object at `path`
///
/// Returns the number of fields actually removed.
///
/// # Errors
///
/// Returns [`StateError::NotAnObject`] if `path` addresses a non-object.
pub fn remove_fields(doc: &mut Value, path: &StatePath, names: &[&str]) -> Result<usize, StateError> {
    let Some(target) = get_at_mut(doc, path) else {
        return Ok(0);
    };
    let Value::Object(map) = target else {
        return Err(StateError::not_an_object(path, target));
    };
    Ok(names
        .iter()
        .filter(|name| map.shift_remove(**name).is_some())
        .count())
}

/// Coerce a numeric value to its floating-point representation
///
/// - number → same magnitude as a float (`10` → `10.0`)
/// - numeric string → parsed float (`"10"` → `10.0`)
/// - any other value, including non-numeric strings and `null`, is returned unchanged
///
/// Applying it twice gives the same result as applying it once.
#[must_use]
pub fn convert_to_float64(value: &Value) -> Value {
    match value {
        Value::Number(n) => n.as_f64().map_or_else(|| value.clone(), Value::from),
        Value::String(s) => match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::from(f),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Whether a value carries no information
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => matches!(s.as_str(), "" | "{}" | "[]" | "null"),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Delete the field at `field_path` if its value is empty
///
/// Empty means `null`, `{}`, `[]`, `""`, or a string spelling one of those
/// (`"{}"`, `"[]"`, `"null"`). Returns `true` if the field was deleted.
///
/// # Errors
///
/// Currently infallible; the signature matches the other primitives.
pub fn cleanup_empty_field(doc: &mut Value, field_path: &StatePath) -> Result<bool, StateError> {
    match get_at(doc, field_path) {
        Some(value) if is_empty_value(value) => Ok(delete_at(doc, field_path).is_some()),
        _ => Ok(false),
    }
}

/// Delete the object at `field_path` when every listed subfield is null or absent
///
/// A field whose value is `null` itself is also deleted. Returns `true` if
/// the field was deleted.
///
/// # Errors
///
/// Returns [`StateError::UnexpectedType`] when the field holds a scalar or array.
pub fn remove_object_if_all_null(
    doc: &mut Value,
    field_path: &StatePath,
    subfields: &[&str],
) -> Result<bool, StateError> {
    let all_null = match get_at(doc, field_path) {
        None => return Ok(false),
        Some(Value::Null) => true,
        Some(Value::Object(map)) => subfields
            .iter()
            .all(|name| map.get(*name).map_or(true, Value::is_null)),
        Some(other) => return Err(StateError::unexpected_type(field_path, "object", other)),
    };

    if all_null {
        delete_at(doc, field_path);
        tracing::trace!(path = %field_path, "removed all-null object");
    }
    Ok(all_null)
}

/// Make sure both `created_on` and `modified_on` are populated
///
/// - created present, modified missing → modified copies created
/// - both missing → both get `default`
/// - only modified present → created gets `default`
///
/// A `null` timestamp counts as missing.
///
/// # Errors
///
/// Returns [`StateError::NotAnObject`] if `path` addresses a non-object.
pub fn ensure_timestamps(doc: &mut Value, path: &StatePath, default: &str) -> Result<(), StateError> {
    let present = |doc: &Value, field: &str| {
        get_at(doc, &path.child(field))
            .filter(|v| !v.is_null())
            .cloned()
    };

    let created = present(doc, CREATED_ON);
    let modified = present(doc, MODIFIED_ON);

    match (created, modified) {
        (Some(created), None) => {
            set_at(doc, &path.child(MODIFIED_ON), created)?;
        }
        (None, None) => {
            set_at(doc, &path.child(CREATED_ON), Value::from(default))?;
            set_at(doc, &path.child(MODIFIED_ON), Value::from(default))?;
        }
        (None, Some(_)) => {
            set_at(doc, &path.child(CREATED_ON), Value::from(default))?;
        }
        (Some(_), Some(_)) => {}
    }
    Ok(())
}
