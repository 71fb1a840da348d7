//! Testing utilities for tfmigrate workspace
//!
//! Table-driven runners for migrator tests and stub migrators for engine tests.

#![allow(missing_docs)]

use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use tfm_core::{
    Context, MigrateConfig, MigrationError, MigratorRegistry, Pipeline, ResourceMigrator,
    TransformResult,
};
use tfm_hcl::{edit, Block};
use tfm_state::StatePath;

pub const SOURCE_VERSION: &str = "v4";
pub const TARGET_VERSION: &str = "v5";

#[derive(Debug, Clone, Copy)]
pub struct ConfigTestCase {
    pub name: &'static str,
    pub input: &'static str,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct StateTestCase {
    pub name: &'static str,
    pub input: &'static str,
    pub expected: &'static str,
}

pub fn test_config() -> MigrateConfig {
    MigrateConfig::new().with_versions(SOURCE_VERSION, TARGET_VERSION)
}

/// Registry holding one migrator under its old type name
pub fn registry_with(migrator: Arc<dyn ResourceMigrator>) -> Arc<MigratorRegistry> {
    let mut registry = MigratorRegistry::new();
    let old = migrator.resource_rename().0.to_string();
    registry
        .register(&old, SOURCE_VERSION, TARGET_VERSION, migrator)
        .unwrap();
    Arc::new(registry)
}

pub fn migrate_config(registry: Arc<MigratorRegistry>, src: &str) -> Context {
    let config = test_config();
    let mut ctx = Context::new(src, &config).with_name("main.tf");
    Pipeline::config(registry, &config).run(&mut ctx).unwrap();
    ctx
}

pub fn migrate_state(registry: Arc<MigratorRegistry>, src: &str) -> Context {
    let config = test_config();
    let mut ctx = Context::new(src, &config).with_name("terraform.tfstate");
    Pipeline::state(registry).run(&mut ctx).unwrap();
    ctx
}

/// Run config cases; output and expectation are compared after trimming
pub fn run_config_transform_tests(cases: &[ConfigTestCase], migrator: Arc<dyn ResourceMigrator>) {
    let registry = registry_with(migrator);
    for case in cases {
        let ctx = migrate_config(Arc::clone(&registry), case.input);
        assert_eq!(
            ctx.content.trim(),
            case.expected.trim(),
            "config case failed: {}",
            case.name
        );
    }
}

/// Run state cases; documents are compared as JSON values
pub fn run_state_transform_tests(cases: &[StateTestCase], migrator: Arc<dyn ResourceMigrator>) {
    let registry = registry_with(migrator);
    for case in cases {
        let ctx = migrate_state(Arc::clone(&registry), case.input);
        let actual: Value = serde_json::from_str(&ctx.content).unwrap();
        let expected: Value = serde_json::from_str(case.expected).unwrap();
        assert_eq!(actual, expected, "state case failed: {}", case.name);
    }
}

/// Renames the resource type and stamps instances without touching attributes
#[derive(Debug, Clone)]
pub struct RenameOnlyMigrator {
    pub from: &'static str,
    pub to: &'static str,
}

impl RenameOnlyMigrator {
    pub fn new(from: &'static str, to: &'static str) -> Self {
        Self { from, to }
    }
}

impl ResourceMigrator for RenameOnlyMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == self.from
    }

    fn resource_type(&self) -> &str {
        self.to
    }

    fn resource_rename(&self) -> (&str, &str) {
        (self.from, self.to)
    }

    fn transform_config(
        &self,
        _ctx: &mut Context,
        block: &mut Block,
    ) -> Result<TransformResult, MigrationError> {
        edit::rename_resource_type(block, self.from, self.to);
        Ok(TransformResult::unchanged())
    }

    fn transform_state(
        &self,
        _ctx: &mut Context,
        instance: &Value,
        _path: &StatePath,
        _resource_name: &str,
    ) -> Result<Option<Value>, MigrationError> {
        Ok(Some(instance.clone()))
    }
}

/// Fails on every block and on instances whose resource name starts with `bad`
#[derive(Debug, Clone)]
pub struct FailingMigrator {
    pub resource_type: &'static str,
}

impl ResourceMigrator for FailingMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == self.resource_type
    }

    fn resource_type(&self) -> &str {
        self.resource_type
    }

    fn resource_rename(&self) -> (&str, &str) {
        (self.resource_type, self.resource_type)
    }

    fn transform_config(
        &self,
        _ctx: &mut Context,
        block: &mut Block,
    ) -> Result<TransformResult, MigrationError> {
        block.body.remove_attribute("id");
        Err(MigrationError::invalid_block("unsupported block"))
    }

    fn transform_state(
        &self,
        _ctx: &mut Context,
        instance: &Value,
        _path: &StatePath,
        resource_name: &str,
    ) -> Result<Option<Value>, MigrationError> {
        if resource_name.starts_with("bad") {
            return Err(MigrationError::invalid_instance("unsupported instance"));
        }
        Ok(Some(instance.clone()))
    }
}
