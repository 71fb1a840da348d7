//! Configuration document handlers

use super::{Handler, CONFIG_TRANSFORMATIONS, REFERENCES_RENAMED};
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::error::PipelineError;
use crate::registry::MigratorRegistry;
use std::sync::Arc;
use tfm_hcl::{edit, Body, ConfigFile, Structure};

/// Run every migrator's preprocess hook over the raw text
#[derive(Debug)]
pub struct PreprocessHandler {
    registry: Arc<MigratorRegistry>,
}

impl PreprocessHandler {
    /// Create handler over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<MigratorRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for PreprocessHandler {
    fn name(&self) -> &'static str {
        "preprocess"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        for (_, migrator) in self
            .registry
            .migrators_for(&ctx.source_version, &ctx.target_version)
        {
            ctx.content = migrator.preprocess(&ctx.content);
        }
        Ok(())
    }
}

/// Parse the text into a lossless syntax tree
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseConfigHandler;

impl Handler for ParseConfigHandler {
    fn name(&self) -> &'static str {
        "parse_config"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        ctx.config = Some(ConfigFile::parse(&ctx.content)?);
        Ok(())
    }
}

/// Dispatch every top-level `resource` block to its migrator
///
/// A failing migrator leaves its block exactly as it was and records an
/// error diagnostic addressed by the block address.
#[derive(Debug)]
pub struct ConfigTransformHandler {
    registry: Arc<MigratorRegistry>,
}

impl ConfigTransformHandler {
    /// Create handler over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<MigratorRegistry>) -> Self {
        Self { registry }
    }

    /// Transform the block at `index`; returns the index of the next item
    ///
    /// Blocks the migrator changed, and blocks it added, are marked rewritten.
    fn transform_at(&self, ctx: &mut Context, file: &mut ConfigFile, index: usize, count: &mut usize) -> usize {
        let Some(Structure::Block(block)) = file.body().get(index) else {
            return index + 1;
        };
        if edit::block_type(block) != "resource" {
            return index + 1;
        }
        let Some(resource_type) = edit::block_label(block, 0).map(str::to_string) else {
            return index + 1;
        };

        let Some(migrator) =
            self.registry
                .lookup(&resource_type, &ctx.source_version, &ctx.target_version)
        else {
            tracing::debug!(resource_type = %resource_type, "no migrator for resource block");
            let detail = format!(
                "No migrator found for resource: {resource_type} ({} -> {})",
                ctx.source_version, ctx.target_version
            );
            ctx.push_diagnostic(
                Diagnostic::warning(format!("Failed to transform resource: {resource_type}"), detail)
                    .with_subject(edit::block_address(block)),
            );
            return index + 1;
        };

        let mut block = match file.body_mut().remove(index) {
            Structure::Block(block) => block,
            other => {
                file.body_mut().insert(index, other);
                return index + 1;
            }
        };
        let snapshot = block.clone();
        let address = edit::block_address(&snapshot);
        match migrator.transform_config(ctx, &mut block) {
            Ok(result) => {
                *count += 1;
                tracing::debug!(address = %address, "transformed resource block");
                let mut next = index;
                if !result.remove_original {
                    let changed = Body::from_iter([block.clone()]).to_string()
                        != Body::from_iter([snapshot.clone()]).to_string();
                    file.body_mut().insert(index, block);
                    if changed {
                        file.mark_rewritten(index);
                    }
                    next += 1;
                }
                for extra in result.blocks {
                    file.insert_block(next, extra);
                    next += 1;
                }
                next
            }
            Err(err) => {
                tracing::error!(address = %address, error = %err, "error transforming resource block");
                file.body_mut().insert(index, snapshot);
                ctx.push_diagnostic(
                    Diagnostic::error(format!("Failed to transform resource: {resource_type}"), err.to_string())
                        .with_subject(address),
                );
                index + 1
            }
        }
    }
}

impl Handler for ConfigTransformHandler {
    fn name(&self) -> &'static str {
        "config_transform"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        let mut file = ctx
            .config
            .take()
            .ok_or_else(|| PipelineError::missing_document(self.name(), "configuration"))?;

        let mut count = 0;
        let mut index = 0;
        while index < file.body().len() {
            index = self.transform_at(ctx, &mut file, index, &mut count);
        }

        tracing::debug!(document = ctx.display_name(), count, "transformed resource blocks");
        ctx.metadata.set(CONFIG_TRANSFORMATIONS, count);
        ctx.config = Some(file);
        Ok(())
    }
}

/// Rewrite `old_type.name` references for every registered rename
#[derive(Debug)]
pub struct ReferenceRenameHandler {
    registry: Arc<MigratorRegistry>,
}

impl ReferenceRenameHandler {
    /// Create handler over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<MigratorRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for ReferenceRenameHandler {
    fn name(&self) -> &'static str {
        "reference_rename"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        let file = ctx
            .config
            .as_mut()
            .ok_or_else(|| PipelineError::missing_document(self.name(), "configuration"))?;

        let mut total = 0;
        for (old, new) in self.registry.renames(&ctx.source_version, &ctx.target_version) {
            let renamed = edit::rename_references(file.body_mut(), &old, &new);
            if renamed > 0 {
                tracing::debug!(from = %old, to = %new, count = renamed, "renamed references");
            }
            total += renamed;
        }
        ctx.metadata.set(REFERENCES_RENAMED, total);
        Ok(())
    }
}

/// Serialize the tree back to text
///
/// With formatting enabled, blocks a migrator rewrote get canonical layout.
/// Everything else, and everything when formatting is disabled, is written
/// back exactly as parsed, edits included.
#[derive(Debug, Clone, Copy)]
pub struct FormatHandler {
    format: bool,
}

impl FormatHandler {
    /// Create handler
    #[inline]
    #[must_use]
    pub fn new(format: bool) -> Self {
        Self { format }
    }
}

impl Handler for FormatHandler {
    fn name(&self) -> &'static str {
        "format"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        let file = ctx
            .config
            .as_mut()
            .ok_or_else(|| PipelineError::missing_document(self.name(), "configuration"))?;
        if self.format {
            tracing::debug!(blocks = file.rewritten().len(), "formatting rewritten blocks");
            file.format_rewritten();
        }
        ctx.content = file.to_string();
        Ok(())
    }
}

/// Run every migrator's postprocess hook over the serialized text
#[derive(Debug)]
pub struct PostprocessHandler {
    registry: Arc<MigratorRegistry>,
}

impl PostprocessHandler {
    /// Create handler over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<MigratorRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for PostprocessHandler {
    fn name(&self) -> &'static str {
        "postprocess"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        for (_, migrator) in self
            .registry
            .migrators_for(&ctx.source_version, &ctx.target_version)
        {
            ctx.content = migrator.postprocess(&ctx.content);
        }
        Ok(())
    }
}
