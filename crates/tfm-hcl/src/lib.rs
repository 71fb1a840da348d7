//! Configuration syntax for migrations
//!
//! Parsing and the syntax tree come from `hcl-edit`, which keeps every byte of
//! whitespace and every comment. On top of it this crate adds the document
//! wrapper, a layout pass for rewritten blocks, and the Config Tree
//! Primitives used by resource migrators.
//!
//! # Core Concepts
//!
//! - [`ConfigFile`]: parsed document; writes back exactly what was read, edits aside
//! - [`Body`] / [`Block`] / [`Attribute`] / [`Expression`]: `hcl-edit` tree nodes
//! - [`format`]: indentation and `=` alignment for blocks a migrator changed
//! - [`edit`]: renames, block/attribute conversion, hoisting, key and reference rewrites
//!
//! # Example
//!
//! ```rust
//! use tfm_hcl::{edit, ConfigFile};
//!
//! let src = "resource \"cloudflare_record\" \"www\" {\n  value = \"192.0.2.1\"\n}\n";
//! let mut file = ConfigFile::parse(src).unwrap();
//!
//! let block = edit::find_block_by_type(file.body_mut(), "resource").unwrap();
//! edit::rename_resource_type(block, "cloudflare_record", "cloudflare_dns_record");
//! edit::rename_attribute(&mut block.body, "value", "content").unwrap();
//! edit::ensure_attribute(&mut block.body, "ttl", edit::number(1)).unwrap();
//!
//! file.mark_rewritten(0);
//! file.format_rewritten();
//! assert_eq!(
//!     file.to_string(),
//!     "resource \"cloudflare_dns_record\" \"www\" {\n  content = \"192.0.2.1\"\n  ttl     = 1\n}\n"
//! );
//! ```

#![warn(unreachable_pub)]

pub mod edit;
mod error;
mod file;
pub mod format;

pub use error::{EditError, SyntaxError};
pub use file::{parse_block, ConfigFile};
pub use hcl_edit::expr::Expression;
pub use hcl_edit::structure::{Attribute, Block, Body, Structure};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
