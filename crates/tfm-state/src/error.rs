//! Error types for state tree editing

use crate::path::{PathError, StatePath};

/// State primitive failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// Value at path exists but is not an object
    #[error("expected object at `{path}`, found {found}")]
    NotAnObject {
        /// Location of the offending value
        path: StatePath,
        /// JSON kind that was found
        found: &'static str,
    },

    /// Value has a shape the primitive cannot restructure
    #[error("unexpected {found} at `{path}`: {expected} required")]
    UnexpectedType {
        /// Location of the offending value
        path: StatePath,
        /// What the primitive needed
        expected: &'static str,
        /// JSON kind that was found
        found: &'static str,
    },

    /// Intermediate path segment missing
    #[error("path not found: `{0}`")]
    PathNotFound(StatePath),

    /// Path could not be parsed
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

impl StateError {
    /// Create not-an-object error from the offending value
    #[inline]
    #[must_use]
    pub fn not_an_object(path: &StatePath, value: &serde_json::Value) -> Self {
        Self::NotAnObject {
            path: path.clone(),
            found: kind_name(value),
        }
    }

    /// Create unexpected type error from the offending value
    #[inline]
    #[must_use]
    pub fn unexpected_type(
        path: &StatePath,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Self::UnexpectedType {
            path: path.clone(),
            expected,
            found: kind_name(value),
        }
    }
}

/// Human-readable JSON kind
#[must_use]
pub fn kind_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_messages_are_lowercase() {
        let err = StateError::not_an_object(&StatePath::key("attributes"), &json!([1]));
        assert_eq!(err.to_string(), "expected object at `attributes`, found array");

        let err = StateError::unexpected_type(&StatePath::key("data"), "array or object", &json!(3));
        assert_eq!(
            err.to_string(),
            "unexpected number at `data`: array or object required"
        );
    }

    #[test]
    fn path_error_converts() {
        let err: StateError = PathError::EmptySegment.into();
        assert!(matches!(err, StateError::InvalidPath(_)));
    }
}
