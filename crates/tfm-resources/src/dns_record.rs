//! DNS records: `cloudflare_record` (v4) to `cloudflare_dns_record` (v5)
//!
//! Simple record kinds carry their payload in `content` (formerly `value`).
//! Structured kinds (SRV, CAA, TLSA, ...) carry it in `data`, which moves from
//! a repeated block / one-element list to a single object.

use serde_json::{json, Value};
use tfm_core::{Context, Diagnostic, MigrationError, ResourceMigrator, TransformResult};
use tfm_hcl::{edit, Block, Body};
use tfm_state::{
    cleanup_empty_field, convert_to_float64, delete_at, ensure_field, ensure_timestamps, kind_name,
    remove_fields, remove_object_if_all_null, set_at, transform_data_field_array_to_object,
    ArrayToObjectOptions, StatePath,
};

const OLD_TYPE: &str = "cloudflare_record";
const NEW_TYPE: &str = "cloudflare_dns_record";

/// Record kinds whose payload lives in `data`
const DATA_TYPES: &[&str] = &[
    "SRV", "CAA", "CERT", "DNSKEY", "DS", "LOC", "NAPTR", "SMIMEA", "SSHFP", "SVCB", "HTTPS",
    "TLSA", "URI",
];

/// Record kinds that never carry `data` (MX only when `data` is not a list)
const SIMPLE_TYPES: &[&str] = &["A", "AAAA", "CNAME", "MX", "NS", "PTR", "TXT", "OPENPGPKEY"];

/// `data` subfields that become floats
const NUMERIC_DATA_FIELDS: &[&str] = &[
    "algorithm",
    "key_tag",
    "type",
    "usage",
    "selector",
    "matching_type",
    "weight",
    "priority",
    "port",
    "protocol",
    "digest_type",
    "order",
    "preference",
    "altitude",
    "lat_degrees",
    "lat_minutes",
    "lat_seconds",
    "long_degrees",
    "long_minutes",
    "long_seconds",
    "precision_horz",
    "precision_vert",
    "size",
];

const SETTINGS_FLAGS: &[&str] = &["flatten_cname", "ipv4_only", "ipv6_only"];
const DEPRECATED_FIELDS: &[&str] = &["hostname", "allow_overwrite", "timeouts", "metadata"];

fn uses_data_field(record_type: &str) -> bool {
    DATA_TYPES.contains(&record_type)
}

/// Kinds whose `priority` lives at the root in v5
fn has_root_priority(record_type: &str) -> bool {
    matches!(record_type, "SRV" | "MX" | "URI")
}

/// Kinds whose `priority` is removed from `data` once hoisted
fn drops_data_priority(record_type: &str) -> bool {
    matches!(record_type, "MX" | "URI")
}

/// DNS record migrator
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
        edit::ensure_attribute(body, "ttl", edit::number(1))?;

        // Dynamic `type` expressions resolve to "" and are treated as simple
        let record_type = body
            .get_attribute("type")
            .and_then(edit::extract_string_from_attribute)
            .unwrap_or_default();

        if !uses_data_field(&record_type) {
            if let Some(value) = body.get_attribute("value").map(|a| a.value.clone()) {
                edit::set_attribute(body, "content", value)?;
                edit::remove_attributes(body, &["value"]);
            }
        }
        edit::remove_attributes(body, &["allow_overwrite", "hostname"]);

        convert_data_blocks(ctx, body, &record_type, &address)?;

        if record_type == "CAA" {
            edit::update_attribute(body, "data", |data| {
                edit::rename_object_keys(&mut data.value, "content", "value");
            });
        }

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
        let Value::Object(fields) = attrs else {
            return Err(MigrationError::invalid_instance(format!(
                "attributes at `{path}` is {}",
                kind_name(attrs)
            )));
        };
        if !["name", "type", "zone_id"].iter().all(|f| fields.contains_key(*f)) {
            return Ok(Some(out));
        }

        let at = StatePath::key("attributes");
        let record_type = attrs.get("type").and_then(Value::as_str).unwrap_or_default();
        tracing::debug!(path = %path, record_type, "migrating dns record instance");

        cleanup_empty_field(&mut out, &at.child("meta"))?;
        remove_object_if_all_null(&mut out, &at.child("settings"), SETTINGS_FLAGS)?;
        ensure_timestamps(&mut out, &at, &ctx.default_timestamp)?;
        migrate_content(&mut out, &at, attrs, record_type)?;
        ensure_field(&mut out, &at, "ttl", json!(1.0))?;
        remove_fields(&mut out, &at, DEPRECATED_FIELDS)?;
        migrate_data(ctx, &mut out, attrs, record_type, path)?;

        if let Some(priority @ Value::Number(_)) = attrs.get("priority") {
            set_at(&mut out, &at.child("priority"), convert_to_float64(priority))?;
        }

        Ok(Some(out))
    }
}

/// Hoist `priority` and turn `data { }` blocks into `data = { }`
fn convert_data_blocks(
    ctx: &mut Context,
    body: &mut Body,
    record_type: &str,
    address: &str,
) -> Result<(), MigrationError> {
    // SRV keeps priority in both places
    if has_root_priority(record_type) {
        edit::hoist_attribute_from_block(body, "data", "priority")?;
    }

    let found = edit::convert_blocks_to_attribute(body, "data", "data", |data| {
        if record_type == "CAA" {
            // `value` is a valid identifier
            let _ = edit::rename_attribute(&mut data.body, "content", "value");
        }
        if drops_data_priority(record_type) {
            edit::remove_attributes(&mut data.body, &["priority"]);
        }
    })?;

    if found > 1 {
        ctx.push_diagnostic(
            Diagnostic::warning(
                format!("Multiple data blocks in {NEW_TYPE}"),
                format!("kept the first of {found} data blocks; the others were removed"),
            )
            .with_subject(address),
        );
    }
    Ok(())
}

/// `value` becomes `content` for simple kinds; structured kinds drop both
fn migrate_content(
    out: &mut Value,
    at: &StatePath,
    attrs: &Value,
    record_type: &str,
) -> Result<(), MigrationError> {
    if uses_data_field(record_type) {
        delete_at(out, &at.child("value"));
        delete_at(out, &at.child("content"));
        return Ok(());
    }

    let Some(value) = attrs.get("value") else {
        return Ok(());
    };
    let has_content = attrs.get("content").is_some_and(|c| !c.is_null());
    if !has_content {
        set_at(out, &at.child("content"), value.clone())?;
    }
    delete_at(out, &at.child("value"));
    Ok(())
}

/// Restructure `data` and derive root `content` / `priority` from it
fn migrate_data(
    ctx: &mut Context,
    out: &mut Value,
    attrs: &Value,
    record_type: &str,
    path: &StatePath,
) -> Result<(), MigrationError> {
    let at = StatePath::key("attributes");
    let data = attrs.get("data");
    let data_is_list = matches!(data, Some(Value::Array(_)));

    // MX with a data list is handled like a structured kind
    if SIMPLE_TYPES.contains(&record_type) && (!data_is_list || record_type != "MX") {
        delete_at(out, &at.child("data"));
        return Ok(());
    }

    let outcome = transform_data_field_array_to_object(out, &at, record_type, &data_options(record_type))?;
    if outcome.discarded() > 0 {
        ctx.push_diagnostic(
            Diagnostic::warning(
                format!("Discarded extra data entries in {NEW_TYPE}"),
                format!(
                    "kept the first of {} data entries for {record_type} record",
                    outcome.discarded() + 1
                ),
            )
            .with_subject(path.child("attributes").child("data")),
        );
    }

    let first = match data {
        Some(Value::Array(items)) => items.first(),
        _ => None,
    };

    if record_type == "CAA" {
        if let Some(content) = first.and_then(caa_content) {
            set_at(out, &at.child("content"), Value::String(content))?;
        }
    }

    if has_root_priority(record_type) {
        let priority = attrs
            .get("priority")
            .or_else(|| first.and_then(|f| f.get("priority")));
        if let Some(priority) = priority {
            set_at(out, &at.child("priority"), convert_to_float64(priority))?;
        }
        let content = match record_type {
            "MX" => first.and_then(mx_content),
            "URI" => first.and_then(uri_content),
            _ => None,
        };
        if let Some(content) = content {
            set_at(out, &at.child("content"), Value::String(content))?;
        }
    }
    Ok(())
}

fn data_options(record_type: &str) -> ArrayToObjectOptions {
    let mut options = ArrayToObjectOptions::new()
        .skip("name")
        .skip("proto")
        .transform("flags", flags_value)
        .transform_all(NUMERIC_DATA_FIELDS, convert_to_float64);
    if record_type == "CAA" {
        options = options
            .rename("content", "value")
            .default_value("flags", Value::Null);
    }
    if drops_data_priority(record_type) {
        options = options.skip("priority");
    }
    options
}

/// CAA flags become `{ "type": "string", "value": "<flags>" }`; empty means null
fn flags_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => json!({ "type": "string", "value": n.to_string() }),
        Value::String(s) if !s.is_empty() => json!({ "type": "string", "value": s }),
        _ => Value::Null,
    }
}

/// Text of a scalar as it appears in a record's wire form
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}

/// `<flags> <tag> <value>`; flags default to `0`
fn caa_content(data: &Value) -> Option<String> {
    let tag = data.get("tag")?;
    let value = data.get("content")?;
    let flags = match data.get("flags") {
        Some(n @ Value::Number(_)) => plain_text(n),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "0".to_string(),
    };
    Some(format!("{flags} {} {}", plain_text(tag), plain_text(value)))
}

/// `<priority> <target>`
fn mx_content(data: &Value) -> Option<String> {
    let priority = data.get("priority")?;
    let target = data.get("target")?;
    Some(format!("{} {}", plain_text(priority), plain_text(target)))
}

/// `<priority> <weight> <target>`
fn uri_content(data: &Value) -> Option<String> {
    let priority = data.get("priority")?;
    let weight = data.get("weight")?;
    let target = data.get("target")?;
    Some(format!(
        "{} {} {}",
        plain_text(priority),
        plain_text(weight),
        plain_text(target)
    ))
}
