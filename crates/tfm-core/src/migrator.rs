//! Migrator capability contract
//!
//! Every resource module implements [`ResourceMigrator`] once per
//! (old type, source version, target version) triple. The engine owns the
//! traversal; a migrator only rewrites the single block or instance it is
//! handed.
//!
//! Migrators are shared across threads through the registry and receive
//! `&self`, so they must not keep state between calls.

use crate::context::Context;
use crate::error::MigrationError;
use serde_json::Value;
use tfm_hcl::Block;
use tfm_state::StatePath;

/// Outcome of a config block rewrite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformResult {
    /// Blocks inserted directly after the original block
    pub blocks: Vec<Block>,
    /// Drop the original block from the document
    pub remove_original: bool,
}

impl TransformResult {
    /// Keep the (edited) original block, add nothing
    #[inline]
    #[must_use]
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Replace the original block with `blocks`
    #[inline]
    #[must_use]
    pub fn replace(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            remove_original: true,
        }
    }

    /// Keep the original block and insert `block` after it
    #[inline]
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

/// Resource-specific rewrite rules
pub trait ResourceMigrator: Send + Sync {
    /// Check if this migrator rewrites resources of `resource_type`
    fn can_handle(&self, resource_type: &str) -> bool;

    /// Resource type name after migration
    fn resource_type(&self) -> &str;

    /// `(old, new)` type names, consumed by the reference rename pass
    fn resource_rename(&self) -> (&str, &str);

    /// Raw text hook run before the document is parsed
    fn preprocess(&self, content: &str) -> String {
        content.to_string()
    }

    /// Raw text hook run after the document is serialized
    fn postprocess(&self, content: &str) -> String {
        content.to_string()
    }

    /// Rewrite one `resource` block in place
    ///
    /// # Errors
    ///
    /// Any error leaves the block exactly as it was before the call.
    fn transform_config(
        &self,
        ctx: &mut Context,
        block: &mut Block,
    ) -> Result<TransformResult, MigrationError>;

    /// Rewrite one state instance
    ///
    /// Returns `Ok(None)` when the instance needs no change. The engine stamps
    /// [`target_schema_version`](Self::target_schema_version) on every
    /// returned instance.
    ///
    /// # Errors
    ///
    /// Any error leaves the instance exactly as it was before the call.
    fn transform_state(
        &self,
        ctx: &mut Context,
        instance: &Value,
        path: &StatePath,
        resource_name: &str,
    ) -> Result<Option<Value>, MigrationError>;

    /// `schema_version` of migrated instances
    fn target_schema_version(&self) -> u64 {
        0
    }
}

impl std::fmt::Debug for dyn ResourceMigrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (old, new) = self.resource_rename();
        f.debug_struct("ResourceMigrator")
            .field("from", &old)
            .field("to", &new)
            .finish()
    }
}
