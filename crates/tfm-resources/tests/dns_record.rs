//! DNS record migration, config and state

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tfm_core::{Severity, DEFAULT_TIMESTAMP};
use tfm_resources::dns_record::V4ToV5Migrator;
use tfm_test_utils::{
    migrate_config, migrate_state, registry_with, run_config_transform_tests,
    run_state_transform_tests, ConfigTestCase, StateTestCase,
};

fn migrator() -> Arc<V4ToV5Migrator> {
    Arc::new(V4ToV5Migrator)
}

fn state_of(attributes: Value) -> String {
    json!({
        "version": 4,
        "terraform_version": "1.5.0",
        "resources": [{
            "mode": "managed",
            "type": "cloudflare_record",
            "name": "r",
            "instances": [{"schema_version": 3, "attributes": attributes}]
        }]
    })
    .to_string()
}

fn migrated_instance(content: &str) -> Value {
    let out: Value = serde_json::from_str(content).unwrap();
    out["resources"][0]["instances"][0].clone()
}

#[test]
fn config_cases() {
    let cases = [
        ConfigTestCase {
            name: "CAA data block becomes attribute with value key",
            input: r#"
resource "cloudflare_record" "caa_test" {
  zone_id = "0da42c8d2132a9ddaf714f9e7c920711"
  name    = "test.example.com"
  type    = "CAA"
  ttl     = 3600

  data {
    flags   = 0
    tag     = "issue"
    content = "letsencrypt.org"
  }
}"#,
            expected: r#"resource "cloudflare_dns_record" "caa_test" {
  zone_id = "0da42c8d2132a9ddaf714f9e7c920711"
  name    = "test.example.com"
  type    = "CAA"
  ttl     = 3600

  data = {
    flags = 0
    tag   = "issue"
    value = "letsencrypt.org"
  }
}"#,
        },
        ConfigTestCase {
            name: "CAA data attribute keys renamed without reordering",
            input: r#"
resource "cloudflare_record" "caa" {
  zone_id = "abc123"
  name    = "test"
  type    = "CAA"
  data = {
    tag     = "issue"
    content = "ca.example.com"
    flags   = "critical"
  }
}"#,
            expected: r#"resource "cloudflare_dns_record" "caa" {
  zone_id = "abc123"
  name    = "test"
  type    = "CAA"
  data = {
    tag   = "issue"
    value = "ca.example.com"
    flags = "critical"
  }
  ttl = 1
}"#,
        },
        ConfigTestCase {
            name: "A record keeps content and ttl",
            input: r#"
resource "cloudflare_record" "a_test" {
  zone_id = "0da42c8d2132a9ddaf714f9e7c920711"
  name    = "test.example.com"
  type    = "A"
  ttl     = 3600
  content = "192.168.1.1"
}"#,
            expected: r#"resource "cloudflare_dns_record" "a_test" {
  zone_id = "0da42c8d2132a9ddaf714f9e7c920711"
  name    = "test.example.com"
  type    = "A"
  ttl     = 3600
  content = "192.168.1.1"
}"#,
        },
        ConfigTestCase {
            name: "missing ttl defaults to automatic",
            input: r#"
resource "cloudflare_record" "mx_test" {
  zone_id  = "0da42c8d2132a9ddaf714f9e7c920711"
  name     = "test.example.com"
  type     = "MX"
  content  = "mx.sendgrid.net"
  priority = 10
}"#,
            expected: r#"resource "cloudflare_dns_record" "mx_test" {
  zone_id  = "0da42c8d2132a9ddaf714f9e7c920711"
  name     = "test.example.com"
  type     = "MX"
  content  = "mx.sendgrid.net"
  priority = 10
  ttl      = 1
}"#,
        },
        ConfigTestCase {
            name: "value renamed to content",
            input: r#"
resource "cloudflare_record" "a_test" {
  zone_id         = "0da42c8d2132a9ddaf714f9e7c920711"
  name            = "test.example.com"
  type            = "A"
  value           = "192.168.1.1"
  allow_overwrite = true
}"#,
            expected: r#"resource "cloudflare_dns_record" "a_test" {
  zone_id = "0da42c8d2132a9ddaf714f9e7c920711"
  name    = "test.example.com"
  type    = "A"
  ttl     = 1
  content = "192.168.1.1"
}"#,
        },
        ConfigTestCase {
            name: "MX priority hoisted out of data",
            input: r#"
resource "cloudflare_record" "mx" {
  zone_id = "abc123"
  name    = "@"
  type    = "MX"

  data {
    priority = 10
    target   = "mail.example.com"
  }
}"#,
            expected: r#"resource "cloudflare_dns_record" "mx" {
  zone_id = "abc123"
  name    = "@"
  type    = "MX"

  ttl      = 1
  priority = 10
  data = {
    target = "mail.example.com"
  }
}"#,
        },
        ConfigTestCase {
            name: "URI priority hoisted out of data",
            input: r#"
resource "cloudflare_record" "uri" {
  zone_id = "abc123"
  name    = "_http._tcp"
  type    = "URI"

  data {
    priority = 10
    weight   = 1
    target   = "http://example.com"
  }
}"#,
            expected: r#"resource "cloudflare_dns_record" "uri" {
  zone_id = "abc123"
  name    = "_http._tcp"
  type    = "URI"

  ttl      = 1
  priority = 10
  data = {
    weight = 1
    target = "http://example.com"
  }
}"#,
        },
        ConfigTestCase {
            name: "record without type treated as simple",
            input: r#"
resource "cloudflare_record" "no_type" {
  zone_id = "abc123"
  name    = "test"
  value   = "192.0.2.1"
}"#,
            expected: r#"resource "cloudflare_dns_record" "no_type" {
  zone_id = "abc123"
  name    = "test"
  ttl     = 1
  content = "192.0.2.1"
}"#,
        },
    ];
    run_config_transform_tests(&cases, migrator());
}

#[test]
fn state_cases() {
    let cases = [
        StateTestCase {
            name: "simple A record drops empty data",
            input: r#"{
                "version": 4,
                "resources": [{
                    "type": "cloudflare_record",
                    "name": "a_test",
                    "instances": [{
                        "attributes": {
                            "id": "test-id",
                            "zone_id": "0da42c8d2132a9ddaf714f9e7c920711",
                            "name": "test.example.com",
                            "type": "A",
                            "content": "192.168.1.1",
                            "data": []
                        },
                        "schema_version": 3
                    }]
                }]
            }"#,
            expected: r#"{
                "version": 4,
                "resources": [{
                    "type": "cloudflare_dns_record",
                    "name": "a_test",
                    "instances": [{
                        "attributes": {
                            "id": "test-id",
                            "zone_id": "0da42c8d2132a9ddaf714f9e7c920711",
                            "name": "test.example.com",
                            "type": "A",
                            "ttl": 1.0,
                            "content": "192.168.1.1",
                            "created_on": "2024-01-01T00:00:00Z",
                            "modified_on": "2024-01-01T00:00:00Z"
                        },
                        "schema_version": 0
                    }]
                }]
            }"#,
        },
        StateTestCase {
            name: "value moves to content and deprecated fields go",
            input: r#"{
                "version": 4,
                "resources": [{
                    "type": "cloudflare_record",
                    "name": "a_test",
                    "instances": [{
                        "attributes": {
                            "id": "test-id",
                            "zone_id": "zone",
                            "name": "test.example.com",
                            "type": "A",
                            "value": "192.168.1.1",
                            "ttl": 300,
                            "hostname": "test.example.com",
                            "allow_overwrite": true,
                            "metadata": {"auto_added": false},
                            "meta": {},
                            "settings": {"flatten_cname": null, "ipv4_only": null, "ipv6_only": null}
                        }
                    }]
                }]
            }"#,
            expected: r#"{
                "version": 4,
                "resources": [{
                    "type": "cloudflare_dns_record",
                    "name": "a_test",
                    "instances": [{
                        "attributes": {
                            "id": "test-id",
                            "zone_id": "zone",
                            "name": "test.example.com",
                            "type": "A",
                            "ttl": 300,
                            "content": "192.168.1.1",
                            "created_on": "2024-01-01T00:00:00Z",
                            "modified_on": "2024-01-01T00:00:00Z"
                        },
                        "schema_version": 0
                    }]
                }]
            }"#,
        },
        StateTestCase {
            name: "MX data list yields priority and content",
            input: r#"{
                "resources": [{
                    "type": "cloudflare_record",
                    "name": "mx",
                    "instances": [{
                        "attributes": {
                            "id": "mx123",
                            "zone_id": "zone123",
                            "name": "@",
                            "type": "MX",
                            "data": [{"priority": 10, "target": "mail.example.com"}]
                        }
                    }]
                }]
            }"#,
            expected: r#"{
                "resources": [{
                    "type": "cloudflare_dns_record",
                    "name": "mx",
                    "instances": [{
                        "attributes": {
                            "id": "mx123",
                            "zone_id": "zone123",
                            "name": "@",
                            "type": "MX",
                            "priority": 10.0,
                            "content": "10 mail.example.com",
                            "data": {"target": "mail.example.com"},
                            "ttl": 1.0,
                            "created_on": "2024-01-01T00:00:00Z",
                            "modified_on": "2024-01-01T00:00:00Z"
                        },
                        "schema_version": 0
                    }]
                }]
            }"#,
        },
        StateTestCase {
            name: "URI data list yields priority and content",
            input: r#"{
                "resources": [{
                    "type": "cloudflare_record",
                    "name": "uri",
                    "instances": [{
                        "attributes": {
                            "id": "uri123",
                            "zone_id": "zone123",
                            "name": "_http._tcp",
                            "type": "URI",
                            "data": [{"priority": 10, "weight": 1, "target": "http://example.com"}]
                        }
                    }]
                }]
            }"#,
            expected: r#"{
                "resources": [{
                    "type": "cloudflare_dns_record",
                    "name": "uri",
                    "instances": [{
                        "attributes": {
                            "id": "uri123",
                            "zone_id": "zone123",
                            "name": "_http._tcp",
                            "type": "URI",
                            "priority": 10.0,
                            "content": "10 1 http://example.com",
                            "data": {"weight": 1.0, "target": "http://example.com"},
                            "ttl": 1.0,
                            "created_on": "2024-01-01T00:00:00Z",
                            "modified_on": "2024-01-01T00:00:00Z"
                        },
                        "schema_version": 0
                    }]
                }]
            }"#,
        },
        StateTestCase {
            name: "empty attributes are only stamped",
            input: r#"{
                "resources": [{
                    "type": "cloudflare_record",
                    "name": "invalid",
                    "instances": [{"attributes": {}}]
                }]
            }"#,
            expected: r#"{
                "resources": [{
                    "type": "cloudflare_dns_record",
                    "name": "invalid",
                    "instances": [{"attributes": {}, "schema_version": 0}]
                }]
            }"#,
        },
        StateTestCase {
            name: "resource without instances is renamed",
            input: r#"{
                "resources": [{"type": "cloudflare_record", "name": "empty", "instances": []}]
            }"#,
            expected: r#"{
                "resources": [{"type": "cloudflare_dns_record", "name": "empty", "instances": []}]
            }"#,
        },
    ];
    run_state_transform_tests(&cases, migrator());
}

#[test]
fn scenario_caa_state_instance() {
    let src = state_of(json!({
        "id": "test-id",
        "zone_id": "0da42c8d2132a9ddaf714f9e7c920711",
        "name": "test.example.com",
        "type": "CAA",
        "data": [{"flags": 0, "tag": "issue", "content": "letsencrypt.org"}]
    }));
    let ctx = migrate_state(registry_with(migrator()), &src);
    let instance = migrated_instance(&ctx.content);

    assert_eq!(instance["schema_version"], json!(0));
    let attrs = &instance["attributes"];
    assert_eq!(
        attrs["data"],
        json!({
            "flags": {"type": "string", "value": "0"},
            "tag": "issue",
            "value": "letsencrypt.org"
        })
    );
    assert_eq!(attrs["ttl"], json!(1.0));
    assert_eq!(attrs["created_on"], json!(DEFAULT_TIMESTAMP));
    assert_eq!(attrs["modified_on"], json!(DEFAULT_TIMESTAMP));
    assert_eq!(attrs["content"], json!("0 issue letsencrypt.org"));
    assert!(ctx.diagnostics.is_empty());
}

#[test]
fn scenario_unregistered_pair_leaves_entry() {
    let registry = registry_with(Arc::new(
        tfm_resources::zero_trust_gateway_policy::V4ToV5Migrator,
    ));
    let src = state_of(json!({
        "zone_id": "z",
        "name": "www",
        "type": "A",
        "value": "192.0.2.1"
    }));
    let ctx = migrate_state(registry, &src);

    assert_eq!(ctx.content, src);
    assert_eq!(ctx.diagnostics.len(), 1);
    let warning = ctx.diagnostics.iter().next().unwrap();
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.summary.contains("cloudflare_record"));
    assert!(warning.detail.contains("(v4 -> v5)"));
}

#[test]
fn scenario_srv_priority_in_both_places() {
    let src = state_of(json!({
        "id": "test-id",
        "zone_id": "zone",
        "name": "_sip._tcp.example.com",
        "type": "SRV",
        "data": [{"priority": 10, "weight": 60, "port": 5060, "target": "sipserver.example.com"}]
    }));
    let ctx = migrate_state(registry_with(migrator()), &src);
    let attrs = migrated_instance(&ctx.content)["attributes"].clone();

    assert_eq!(attrs["priority"], json!(10.0));
    assert_eq!(
        attrs["data"],
        json!({
            "priority": 10.0,
            "weight": 60.0,
            "port": 5060.0,
            "target": "sipserver.example.com"
        })
    );
    assert!(attrs["priority"].is_f64());
    assert!(attrs.get("content").is_none());
}

#[test]
fn scenario_caa_block_beside_unmigrated_block() {
    let src = r#"resource "cloudflare_record" "caa" {
  zone_id = "abc123"
  name    = "test"
  type    = "CAA"
  ttl     = 300

  data {
    flags   = 0
    tag     = "issue"
    content = "letsencrypt.org"
  }
}

resource "cloudflare_zone_settings_override" "zone" {
  zone_id = "abc123"

  data {
    content = "unchanged"
  }
}
"#;
    let ctx = migrate_config(registry_with(migrator()), src);
    assert_eq!(
        ctx.content,
        r#"resource "cloudflare_dns_record" "caa" {
  zone_id = "abc123"
  name    = "test"
  type    = "CAA"
  ttl     = 300

  data = {
    flags = 0
    tag   = "issue"
    value = "letsencrypt.org"
  }
}

resource "cloudflare_zone_settings_override" "zone" {
  zone_id = "abc123"

  data {
    content = "unchanged"
  }
}
"#
    );
    assert_eq!(ctx.diagnostics.warnings().count(), 1);
}

#[test]
fn extra_data_entries_warn() {
    let src = state_of(json!({
        "zone_id": "zone",
        "name": "caa",
        "type": "CAA",
        "data": [
            {"flags": 0, "tag": "issue", "content": "a.example"},
            {"flags": 0, "tag": "issue", "content": "b.example"}
        ]
    }));
    let ctx = migrate_state(registry_with(migrator()), &src);
    let attrs = migrated_instance(&ctx.content)["attributes"].clone();

    assert_eq!(attrs["data"]["value"], json!("a.example"));
    let warnings: Vec<_> = ctx.diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].subject.as_deref(),
        Some("resources.0.instances.0.attributes.data")
    );
}

#[test]
fn extra_data_blocks_warn() {
    let src = r#"resource "cloudflare_record" "srv" {
  zone_id = "abc123"
  name    = "_sip._tcp"
  type    = "SRV"
  data {
    priority = 10
    weight   = 5
    port     = 5060
    target   = "a.example.com"
  }
  data {
    priority = 20
    weight   = 5
    port     = 5060
    target   = "b.example.com"
  }
}
"#;
    let ctx = migrate_config(registry_with(migrator()), src);
    assert!(ctx.content.contains(r#"target   = "a.example.com""#));
    assert!(!ctx.content.contains("b.example.com"));
    assert!(ctx.content.contains("priority = 10\n  data = {"));

    let warnings: Vec<_> = ctx.diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].subject.as_deref(),
        Some("resource.cloudflare_record.srv")
    );
}

#[test]
fn scalar_attributes_are_an_instance_error() {
    let src = state_of(json!("not an object"));
    let ctx = migrate_state(registry_with(migrator()), &src);
    let instance = migrated_instance(&ctx.content);

    assert_eq!(instance["schema_version"], json!(3));
    assert_eq!(ctx.diagnostics.errors().count(), 1);
}
