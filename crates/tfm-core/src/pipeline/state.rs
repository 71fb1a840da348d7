//! State document handlers

use super::{Handler, DATASOURCES_REMOVED, STATE_TRANSFORMATIONS, TYPES_RENAMED};
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::error::{MigrationError, PipelineError};
use crate::migrator::ResourceMigrator;
use crate::registry::MigratorRegistry;
use serde_json::Value;
use std::sync::Arc;
use tfm_state::{remove_indices, stamp_schema_version, StatePath};

/// Parse the document text as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseStateHandler;

impl Handler for ParseStateHandler {
    fn name(&self) -> &'static str {
        "parse_state"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        if ctx.content.trim().is_empty() {
            return Err(PipelineError::EmptyContent);
        }
        let doc = serde_json::from_str(&ctx.content).map_err(PipelineError::InvalidJson)?;
        ctx.state = Some(doc);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Counters {
    transformed: usize,
    renamed: usize,
    datasources: Vec<usize>,
}

/// Walk the resource list and dispatch each entry to its migrator
///
/// Datasource entries are dropped after the walk, highest index first. An
/// instance whose migrator fails keeps its previous content and is reported
/// as an error diagnostic.
#[derive(Debug)]
pub struct StateTransformHandler {
    registry: Arc<MigratorRegistry>,
}

impl StateTransformHandler {
    /// Create handler over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<MigratorRegistry>) -> Self {
        Self { registry }
    }

    fn migrate_entry(
        &self,
        ctx: &mut Context,
        index: usize,
        entry: &mut Value,
        counters: &mut Counters,
    ) {
        if entry.get("mode").and_then(Value::as_str) == Some("data") {
            let resource_type = entry.get("type").and_then(Value::as_str).unwrap_or_default();
            tracing::debug!(index, resource_type, "marking datasource for removal");
            counters.datasources.push(index);
            return;
        }

        let Some(resource_type) = entry
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
        else {
            return;
        };

        let Some(migrator) =
            self.registry
                .lookup(&resource_type, &ctx.source_version, &ctx.target_version)
        else {
            tracing::debug!(
                resource_type = %resource_type,
                source = %ctx.source_version,
                target = %ctx.target_version,
                "no migrator for state resource"
            );
            let detail = format!(
                "No migrator found for state resource: {resource_type} ({} -> {})",
                ctx.source_version, ctx.target_version
            );
            ctx.push_diagnostic(
                Diagnostic::warning(format!("Failed to transform resource: {resource_type}"), detail)
                    .with_subject(StatePath::resource(index)),
            );
            return;
        };

        let Some(entry) = entry.as_object_mut() else {
            return;
        };
        if !entry.contains_key("instances") {
            return;
        }

        if migrator.can_handle(&resource_type) {
            let new_type = migrator.resource_type();
            if !new_type.is_empty() && new_type != resource_type {
                tracing::debug!(from = %resource_type, to = new_type, "updated resource type");
                entry.insert("type".to_string(), Value::String(new_type.to_string()));
                counters.renamed += 1;
            }
        }

        let resource_name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let Some(instances) = entry.get_mut("instances").and_then(Value::as_array_mut) else {
            tracing::warn!(index, resource_type = %resource_type, "instances is not a list, skipping");
            return;
        };

        for (position, instance) in instances.iter_mut().enumerate() {
            let path = StatePath::instance(index, position);
            if migrate_instance(migrator.as_ref(), ctx, instance, &path, &resource_name, &resource_type) {
                counters.transformed += 1;
            }
        }
    }
}

/// Apply one instance rewrite; the instance is only replaced on success
fn migrate_instance(
    migrator: &dyn ResourceMigrator,
    ctx: &mut Context,
    instance: &mut Value,
    path: &StatePath,
    resource_name: &str,
    resource_type: &str,
) -> bool {
    let result = match migrator.transform_state(ctx, instance, path, resource_name) {
        Ok(Some(mut value)) => stamp_schema_version(&mut value, migrator.target_schema_version())
            .map(|()| Some(value))
            .map_err(MigrationError::from),
        other => other,
    };

    match result {
        Ok(Some(migrated)) => {
            *instance = migrated;
            true
        }
        Ok(None) => false,
        Err(err) => {
            tracing::error!(
                resource_type,
                path = %path,
                error = %err,
                "error transforming state resource"
            );
            ctx.push_diagnostic(
                Diagnostic::error(format!("Failed to transform resource: {resource_type}"), err.to_string())
                    .with_subject(path),
            );
            false
        }
    }
}

impl Handler for StateTransformHandler {
    fn name(&self) -> &'static str {
        "state_transform"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        let mut doc = ctx
            .state
            .take()
            .ok_or_else(|| PipelineError::missing_document(self.name(), "state"))?;

        let Some(resources) = doc.get_mut("resources").and_then(Value::as_array_mut) else {
            tracing::warn!(document = ctx.display_name(), "no resources found in state document");
            ctx.state = Some(doc);
            return Ok(());
        };

        let mut counters = Counters::default();
        for (index, entry) in resources.iter_mut().enumerate() {
            self.migrate_entry(ctx, index, entry, &mut counters);
        }

        let removed = remove_indices(resources, &counters.datasources);
        if removed > 0 {
            tracing::info!(
                document = ctx.display_name(),
                count = removed,
                "removed datasources from state (refreshed on next plan)"
            );
        }
        tracing::debug!(
            document = ctx.display_name(),
            transformed = counters.transformed,
            renamed = counters.renamed,
            "transformed state resources"
        );

        ctx.metadata.set(STATE_TRANSFORMATIONS, counters.transformed);
        ctx.metadata.set(DATASOURCES_REMOVED, removed);
        ctx.metadata.set(TYPES_RENAMED, counters.renamed);
        ctx.state = Some(doc);
        Ok(())
    }
}

/// Write the state tree back to text when anything changed
///
/// Unchanged documents keep their original bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeStateHandler;

impl Handler for SerializeStateHandler {
    fn name(&self) -> &'static str {
        "serialize_state"
    }

    fn handle(&self, ctx: &mut Context) -> Result<(), PipelineError> {
        let doc = ctx
            .state
            .as_ref()
            .ok_or_else(|| PipelineError::missing_document(self.name(), "state"))?;

        let changed = [STATE_TRANSFORMATIONS, DATASOURCES_REMOVED, TYPES_RENAMED]
            .iter()
            .any(|key| ctx.metadata.get_u64(key).unwrap_or(0) > 0);
        if !changed {
            return Ok(());
        }

        let mut content = serde_json::to_string_pretty(doc).map_err(PipelineError::Serialize)?;
        content.push('\n');
        ctx.content = content;
        Ok(())
    }
}
