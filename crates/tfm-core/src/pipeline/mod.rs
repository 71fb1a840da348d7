//! Document pipelines
//!
//! A [`Pipeline`] is an ordered chain of [`Handler`]s. Each handler runs to
//! completion on the [`Context`] before the next one starts.
//!
//! # Core Concepts
//!
//! - **State pipeline**: parse JSON, migrate resource entries, serialize
//! - **Config pipeline**: text hooks, parse, migrate `resource` blocks,
//!   rename references, format, text hooks
//! - **Fatal errors** stop the chain and restore the original content
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tfm_core::{Context, MigrateConfig, MigratorRegistry, Pipeline};
//!
//! let config = MigrateConfig::new();
//! let pipeline = Pipeline::state(Arc::new(MigratorRegistry::new()));
//!
//! let mut ctx = Context::new(r#"{"version": 4, "resources": []}"#, &config);
//! pipeline.run(&mut ctx).unwrap();
//! assert_eq!(ctx.content, r#"{"version": 4, "resources": []}"#);
//! assert!(ctx.diagnostics.is_empty());
//! ```

mod config;
mod state;

pub use config::{
    ConfigTransformHandler, FormatHandler, ParseConfigHandler, PostprocessHandler,
    PreprocessHandler, ReferenceRenameHandler,
};
pub use state::{ParseStateHandler, SerializeStateHandler, StateTransformHandler};

use crate::config::MigrateConfig;
use crate::context::Context;
use crate::error::PipelineError;
use crate::registry::MigratorRegistry;
use std::sync::Arc;

/// Metadata key: state instances rewritten
pub const STATE_TRANSFORMATIONS: &str = "state_transformations";
/// Metadata key: datasource entries removed
pub const DATASOURCES_REMOVED: &str = "datasources_removed";
/// Metadata key: state entries whose `type` was renamed
pub const TYPES_RENAMED: &str = "types_renamed";
/// Metadata key: config blocks rewritten
pub const CONFIG_TRANSFORMATIONS: &str = "config_transformations";
/// Metadata key: references rewritten to new type names
pub const REFERENCES_RENAMED: &str = "references_renamed";

/// One pipeline stage
pub trait Handler: Send + Sync {
    /// Stage name for logs
    fn name(&self) -> &'static str;

    /// Run the stage
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the document cannot be migrated at all.
    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError>;
}

/// Ordered chain of handlers
pub struct Pipeline {
    handlers: Vec<Box<dyn Handler>>,
}

impl Pipeline {
    /// Create empty pipeline
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append handler
    #[inline]
    #[must_use]
    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Pipeline for state documents
    #[must_use]
    pub fn state(registry: Arc<MigratorRegistry>) -> Self {
        Self::new()
            .with_handler(ParseStateHandler)
            .with_handler(StateTransformHandler::new(registry))
            .with_handler(SerializeStateHandler)
    }

    /// Pipeline for configuration documents
    #[must_use]
    pub fn config(registry: Arc<MigratorRegistry>, config: &MigrateConfig) -> Self {
        let mut pipeline = Self::new()
            .with_handler(PreprocessHandler::new(Arc::clone(&registry)))
            .with_handler(ParseConfigHandler)
            .with_handler(ConfigTransformHandler::new(Arc::clone(&registry)));
        if config.rename_references {
            pipeline = pipeline.with_handler(ReferenceRenameHandler::new(Arc::clone(&registry)));
        }
        pipeline
            .with_handler(FormatHandler::new(config.format_output))
            .with_handler(PostprocessHandler::new(registry))
    }

    /// Handler names in run order
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run every handler in order
    ///
    /// On a fatal error the context content is restored to its input and the
    /// scratch trees are dropped, so no partial output escapes.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`] raised by a handler.
    pub fn run(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        let original = ctx.content.clone();
        for handler in &self.handlers {
            tracing::trace!(handler = handler.name(), document = ctx.display_name(), "running handler");
            if let Err(err) = handler.handle(ctx) {
                tracing::error!(
                    handler = handler.name(),
                    document = ctx.display_name(),
                    error = %err,
                    "document migration aborted"
                );
                ctx.content = original;
                ctx.state = None;
                ctx.config = None;
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handler_names())
            .finish()
    }
}
