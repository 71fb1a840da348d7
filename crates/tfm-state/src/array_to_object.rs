//! Array-to-object restructuring
//!
//! The legacy schema encodes some nested structures as a one-element array
//! (`data: [{...}]`); the new schema uses a plain object (`data: {...}`).
//! [`transform_array_to_object`] performs that conversion with per-call
//! [`ArrayToObjectOptions`] controlling which subfields are skipped, transformed,
//! renamed, or defaulted.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::{delete_at, get_at};
use crate::error::StateError;
use crate::path::StatePath;

/// Stateless per-field value transform
pub type FieldTransform = fn(&Value) -> Value;

/// Options for one array-to-object conversion
///
/// Built fresh per call. Steps are applied in the order skip, transform,
/// rename, default. Transforms see the original field names, and a renamed
/// field wins over one that already carried the new name.
///
/// # Example
///
/// ```rust
/// use tfm_state::{convert_to_float64, ArrayToObjectOptions};
///
/// let options = ArrayToObjectOptions::new()
///     .skip("name")
///     .transform("priority", convert_to_float64)
///     .rename("content", "value")
///     .default_value("flags", serde_json::Value::Null);
/// assert!(options.is_skipped("name"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArrayToObjectOptions {
    skip_fields: HashSet<String>,
    field_transforms: HashMap<String, FieldTransform>,
    rename_fields: IndexMap<String, String>,
    default_fields: IndexMap<String, Value>,
}

impl ArrayToObjectOptions {
    /// Create empty options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `field` out of the resulting object
    #[inline]
    #[must_use]
    pub fn skip(mut self, field: impl Into<String>) -> Self {
        self.skip_fields.insert(field.into());
        self
    }

    /// Apply `transform` to the value of `field`
    #[inline]
    #[must_use]
    pub fn transform(mut self, field: impl Into<String>, transform: FieldTransform) -> Self {
        self.field_transforms.insert(field.into(), transform);
        self
    }

    /// Apply the same `transform` to each of `fields`
    #[must_use]
    pub fn transform_all(mut self, fields: &[&str], transform: FieldTransform) -> Self {
        for field in fields {
            self.field_transforms.insert((*field).to_string(), transform);
        }
        self
    }

    /// Move the value of `from` to `to`
    #[inline]
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_fields.insert(from.into(), to.into());
        self
    }

    /// Insert `field = value` when the element does not carry `field`
    #[inline]
    #[must_use]
    pub fn default_value(mut self, field: impl Into<String>, value: Value) -> Self {
        self.default_fields.insert(field.into(), value);
        self
    }

    /// Check if `field` is skipped
    #[inline]
    #[must_use]
    pub fn is_skipped(&self, field: &str) -> bool {
        self.skip_fields.contains(field)
    }

    /// Build the object from one array element
    fn apply(&self, element: &Map<String, Value>) -> Map<String, Value> {
        let mut kept = Map::new();
        for (key, value) in element {
            if self.skip_fields.contains(key) {
                continue;
            }
            let value = match self.field_transforms.get(key) {
                Some(transform) => transform(value),
                None => value.clone(),
            };
            kept.insert(key.clone(), value);
        }

        // A renamed field replaces any field already holding the new name
        let targets: HashSet<&str> = self
            .rename_fields
            .iter()
            .filter(|(from, _)| kept.contains_key(from.as_str()))
            .map(|(_, to)| to.as_str())
            .collect();
        let mut result = Map::new();
        for (key, value) in kept {
            match self.rename_fields.get(&key) {
                Some(to) => {
                    result.insert(to.clone(), value);
                }
                None if targets.contains(key.as_str()) => {}
                None => {
                    result.insert(key, value);
                }
            }
        }

        for (key, default) in &self.default_fields {
            if !element.contains_key(key) && !result.contains_key(key) {
                result.insert(key.clone(), default.clone());
            }
        }
        result
    }
}

/// What [`transform_array_to_object`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayToObjectOutcome {
    /// Field not present; nothing changed
    Absent,
    /// Field was an empty array and has been deleted
    Removed,
    /// Field was converted; `discarded` trailing elements were dropped
    Converted {
        /// Number of array elements after the first
        discarded: usize,
    },
    /// Field already held an object; nothing changed
    AlreadyObject,
}

impl ArrayToObjectOutcome {
    /// Number of elements dropped by the conversion
    #[inline]
    #[must_use]
    pub fn discarded(self) -> usize {
        match self {
            Self::Converted { discarded } => discarded,
            _ => 0,
        }
    }
}

/// Convert the array at `path.field` into an object built from its first element
///
/// - absent → no-op
/// - `null` → no-op (reported as [`ArrayToObjectOutcome::Absent`])
/// - empty array → field deleted
/// - non-empty array → first element with `options` applied, written back as object
/// - object → no-op
///
/// # Errors
///
/// Returns [`StateError::UnexpectedType`] if the field is a scalar or the first
/// element is not an object.
pub fn transform_array_to_object(
    doc: &mut Value,
    path: &StatePath,
    field: &str,
    options: &ArrayToObjectOptions,
) -> Result<ArrayToObjectOutcome, StateError> {
    let field_path = path.child(field);

    let converted = match get_at(doc, &field_path) {
        None | Some(Value::Null) => return Ok(ArrayToObjectOutcome::Absent),
        Some(Value::Object(_)) => return Ok(ArrayToObjectOutcome::AlreadyObject),
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Array(items)) => match &items[0] {
            Value::Object(element) => Some((options.apply(element), items.len() - 1)),
            other => {
                return Err(StateError::unexpected_type(
                    &field_path.index(0),
                    "object",
                    other,
                ))
            }
        },
        Some(other) => {
            return Err(StateError::unexpected_type(
                &field_path,
                "array or object",
                other,
            ))
        }
    };

    let Some((object, discarded)) = converted else {
        delete_at(doc, &field_path);
        return Ok(ArrayToObjectOutcome::Removed);
    };

    if discarded > 0 {
        tracing::warn!(path = %field_path, discarded, "kept first array element, dropped the rest");
    }
    crate::document::set_at(doc, &field_path, Value::Object(object))?;
    Ok(ArrayToObjectOutcome::Converted { discarded })
}

/// Convert the `data` field of the attributes object at `path`
///
/// `type_discriminator` is the record kind that selected `options`; it only
/// annotates logging.
///
/// # Errors
///
/// Same as [`transform_array_to_object`].
pub fn transform_data_field_array_to_object(
    doc: &mut Value,
    path: &StatePath,
    type_discriminator: &str,
    options: &ArrayToObjectOptions,
) -> Result<ArrayToObjectOutcome, StateError> {
    let outcome = transform_array_to_object(doc, path, "data", options)?;
    tracing::debug!(path = %path, kind = type_discriminator, ?outcome, "restructured data field");
    Ok(outcome)
}
