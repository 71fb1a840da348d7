//! Gateway policies: `cloudflare_teams_rule` (v4) to `cloudflare_zero_trust_gateway_policy` (v5)
//!
//! v4 modelled `rule_settings` and its children as cardinality-one blocks,
//! stored in state as one-element lists. v5 uses nested attributes, stored
//! as plain objects.

use serde_json::{Map, Value};
use tfm_core::{Context, Diagnostic, MigrationError, ResourceMigrator, TransformResult};
use tfm_hcl::{edit, Block, Body, Structure};
use tfm_state::{
    convert_to_float64, delete_at, get_at, kind_name, set_at, transform_array_to_object,
    ArrayToObjectOptions, ArrayToObjectOutcome, StatePath,
};

const OLD_TYPE: &str = "cloudflare_teams_rule";
const NEW_TYPE: &str = "cloudflare_zero_trust_gateway_policy";

/// Single-instance children of `rule_settings`
const NESTED_SETTINGS: &[&str] = &[
    "audit_ssh",
    "l4override",
    "biso_admin_controls",
    "check_session",
    "egress",
    "untrusted_cert",
    "payload_log",
    "notification_settings",
    "dns_resolvers",
    "resolve_dns_internally",
];

/// Browser isolation toggles that have no v5 counterpart
const LEGACY_BISO_FIELDS: &[&str] = &[
    "disable_clipboard_redirection",
    "disable_printing",
    "disable_copy_paste",
    "disable_download",
    "disable_keyboard",
    "disable_upload",
];

/// Gateway policy migrator
#[derive(Debug, Clone, Copy, Default)]
pub struct V4ToV5Migrator;

impl ResourceMigrator for V4ToV5Migrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == OLD_TYPE
    }

    fn resource_type(&self) -> &str {
        NEW_TYPE
    }

    fn resource_rename(&self) -> (&str, &str) {
        (OLD_TYPE, NEW_TYPE)
    }

    fn transform_config(
        &self,
        ctx: &mut Context,
        block: &mut Block,
    ) -> Result<TransformResult, MigrationError> {
        let address = edit::block_address(block);
        edit::rename_resource_type(block, OLD_TYPE, NEW_TYPE);

        let body = &mut block.body;
        if let Some(settings) = edit::find_block_by_type(body, "rule_settings") {
            convert_rule_settings(ctx, &mut settings.body, &address)?;
        }
        // Children first; the parent only converts once it holds no blocks
        edit::convert_single_block_to_attribute(body, "rule_settings", "rule_settings")?;

        Ok(TransformResult::unchanged())
    }

    fn transform_state(
        &self,
        ctx: &mut Context,
        instance: &Value,
        path: &StatePath,
        _resource_name: &str,
    ) -> Result<Option<Value>, MigrationError> {
        let mut out = instance.clone();
        let Some(attrs) = instance.get("attributes") else {
            return Ok(Some(out));
        };
        if !attrs.is_object() {
            return Err(MigrationError::invalid_instance(format!(
                "attributes at `{path}` is {}",
                kind_name(attrs)
            )));
        }

        let at = StatePath::key("attributes");
        for field in ["precedence", "version"] {
            if let Some(value) = attrs.get(field) {
                set_at(&mut out, &at.child(field), convert_to_float64(value))?;
            }
        }
        migrate_rule_settings(ctx, &mut out, path)?;

        Ok(Some(out))
    }
}

fn convert_rule_settings(ctx: &mut Context, settings: &mut Body, address: &str) -> Result<(), MigrationError> {
    edit::rename_attribute(settings, "block_page_reason", "block_reason")?;

    if let Some(notification) = edit::find_block_by_type(settings, "notification_settings") {
        edit::rename_attribute(&mut notification.body, "message", "msg")?;
    }
    if let Some(resolvers) = edit::find_block_by_type(settings, "dns_resolvers") {
        edit::convert_blocks_to_list_attribute(&mut resolvers.body, "ipv4", "ipv4")?;
        edit::convert_blocks_to_list_attribute(&mut resolvers.body, "ipv6", "ipv6")?;
    }

    for name in nested_block_types(settings) {
        if !NESTED_SETTINGS.contains(&name.as_str()) {
            tracing::warn!(address, block = %name, "unrecognized rule_settings block");
            ctx.push_diagnostic(
                Diagnostic::warning(
                    format!("Unrecognized rule_settings block in {NEW_TYPE}"),
                    format!("`{name}` was converted to attribute syntax without field changes"),
                )
                .with_subject(address),
            );
        }
    }
    convert_nested_blocks(settings)
}

/// Distinct nested block types, in order of appearance
fn nested_block_types(body: &Body) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for structure in body.iter() {
        if let Structure::Block(block) = structure {
            let name = edit::block_type(block);
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Turn every nested block into an attribute, innermost first
fn convert_nested_blocks(body: &mut Body) -> Result<(), MigrationError> {
    for name in nested_block_types(body) {
        for block in body.get_blocks_mut(&name) {
            convert_nested_blocks(&mut block.body)?;
        }
        edit::convert_single_block_to_attribute(body, &name, &name)?;
    }
    Ok(())
}

/// `rule_settings` and its children: one-element lists become objects
fn migrate_rule_settings(ctx: &mut Context, out: &mut Value, path: &StatePath) -> Result<(), MigrationError> {
    let at = StatePath::key("attributes");
    let settings = at.child("rule_settings");
    let is_list = matches!(get_at(out, &settings), Some(Value::Array(items)) if !items.is_empty());
    let is_object = matches!(get_at(out, &settings), Some(Value::Object(_)));

    if is_list {
        let options = ArrayToObjectOptions::new().rename("block_page_reason", "block_reason");
        let outcome = transform_array_to_object(out, &at, "rule_settings", &options)?;
        warn_discarded(ctx, path.child("attributes").child("rule_settings"), outcome);
    } else if is_object {
        if let Some(reason) = delete_at(out, &settings.child("block_page_reason")) {
            set_at(out, &settings.child("block_reason"), reason)?;
        }
    } else {
        return Ok(());
    }
    tracing::debug!(path = %path, "restructured rule_settings");

    for name in NESTED_SETTINGS {
        if !matches!(get_at(out, &settings.child(*name)), Some(Value::Array(_))) {
            continue;
        }
        let outcome = transform_array_to_object(out, &settings, name, &nested_options(name))?;
        warn_discarded(
            ctx,
            path.child("attributes").child("rule_settings").child(*name),
            outcome,
        );
    }
    Ok(())
}

fn nested_options(name: &str) -> ArrayToObjectOptions {
    let options = ArrayToObjectOptions::new();
    match name {
        "notification_settings" => options.rename("message", "msg"),
        "l4override" => options.transform("port", convert_to_float64),
        "dns_resolvers" => options
            .transform("ipv4", resolver_ports)
            .transform("ipv6", resolver_ports),
        "biso_admin_controls" => LEGACY_BISO_FIELDS
            .iter()
            .fold(options, |options, field| options.skip(*field)),
        _ => options,
    }
}

fn warn_discarded(ctx: &mut Context, subject: StatePath, outcome: ArrayToObjectOutcome) {
    let discarded = outcome.discarded();
    if discarded == 0 {
        return;
    }
    ctx.push_diagnostic(
        Diagnostic::warning(
            format!("Discarded extra entries in {NEW_TYPE}"),
            format!("kept the first of {} entries; the others were removed", discarded + 1),
        )
        .with_subject(subject),
    );
}

/// Resolver lists keep their shape; each `port` becomes a float
fn resolver_ports(value: &Value) -> Value {
    let mut value = value.clone();
    if let Value::Array(resolvers) = &mut value {
        for resolver in resolvers.iter_mut().filter_map(Value::as_object_mut) {
            coerce_port(resolver);
        }
    }
    value
}

fn coerce_port(fields: &mut Map<String, Value>) {
    if let Some(port) = fields.get_mut("port") {
        *port = convert_to_float64(port);
    }
}
