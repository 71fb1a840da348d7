//! State Tree Primitives
//!
//! Path-addressed editing of JSON state documents. Every primitive mutates a
//! `serde_json::Value` in place; nothing is re-serialized between edits.
//!
//! # Core Concepts
//!
//! - [`StatePath`]: Dot-joined locator made of object keys and array indices
//! - [`document`]: Generic get/set/delete by path and safe multi-index removal
//! - [`primitives`]: Field defaults, removal, numeric coercion, empty cleanup
//! - [`ArrayToObjectOptions`]: Restructuring a one-element array into an object
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tfm_state::{ensure_field, convert_to_float64, StatePath};
//!
//! let mut instance = json!({"attributes": {"name": "www"}});
//! let attrs = StatePath::key("attributes");
//! ensure_field(&mut instance, &attrs, "ttl", json!(1.0)).unwrap();
//!
//! assert_eq!(instance["attributes"]["ttl"], json!(1.0));
//! assert_eq!(convert_to_float64(&json!("10")), json!(10.0));
//! ```

#![warn(unreachable_pub)]

mod array_to_object;
pub mod document;
mod error;
mod path;
pub mod primitives;

pub use array_to_object::{
    transform_array_to_object, transform_data_field_array_to_object, ArrayToObjectOptions,
    ArrayToObjectOutcome, FieldTransform,
};
pub use document::{delete_at, get_at, get_at_mut, remove_indices, set_at, stamp_schema_version};
pub use error::{kind_name, StateError};
pub use path::{PathError, Segment, StatePath};
pub use primitives::{
    cleanup_empty_field, convert_to_float64, ensure_field, ensure_timestamps, remove_fields,
    remove_object_if_all_null, CREATED_ON, MODIFIED_ON,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
