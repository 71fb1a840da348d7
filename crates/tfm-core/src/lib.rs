//! Migration engine
//!
//! Decides which resource migrator applies to which resource occurrence and
//! drives configuration and state documents through their pipelines.
//!
//! # Core Concepts
//!
//! - [`ResourceMigrator`]: Capability contract each resource module implements
//! - [`MigratorRegistry`]: (old type, source version, target version) to migrator
//! - [`Context`]: One document's text, scratch tree, diagnostics, and counters
//! - [`Pipeline`]: Ordered handler chain for state or configuration documents
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tfm_core::{Context, MigrateConfig, MigratorRegistry, Pipeline};
//!
//! let config = MigrateConfig::new();
//! let registry = Arc::new(MigratorRegistry::new());
//! let pipeline = Pipeline::config(registry, &config);
//!
//! let mut ctx = Context::new("resource \"cloudflare_zone\" \"z\" {\n  zone = \"example.com\"\n}\n", &config);
//! pipeline.run(&mut ctx).unwrap();
//!
//! // No migrator registered: the block passes through with a warning
//! assert_eq!(ctx.diagnostics.warnings().count(), 1);
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod migrator;
pub mod pipeline;
pub mod registry;

pub use config::{MigrateConfig, SettingsError, DEFAULT_TIMESTAMP};
pub use context::{Context, Metadata};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{MigrationError, PipelineError, RegistryError};
pub use migrator::{ResourceMigrator, TransformResult};
pub use pipeline::{Handler, Pipeline};
pub use registry::{MigratorRegistry, RegistryKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
