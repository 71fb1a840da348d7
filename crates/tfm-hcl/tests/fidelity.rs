//! Lossless parsing and formatter stability

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tfm_hcl::ConfigFile;

const MIXED: &str = r#"# header comment
terraform {
  required_providers {
    cloudflare = {
      source  = "cloudflare/cloudflare"
      version = "~> 4.0"
    }
  }
}

locals {
  records = { for k, v in var.records : k => v if v.enabled }
  banner = <<-EOT
    Managed by ${var.team}
      indented line
    EOT
}

resource "cloudflare_record" "www" {
  count   = length(local.records) > 0 ? 1 : 0
  zone_id = var.zone_id // zone
  name    = "www-${count.index}"
  value   = "$${not_interpolated}"
  tags    = ["a", "b"]
  /* block
     comment */
}
"#;

#[test]
fn unformatted_write_back_is_identical() {
    let file = ConfigFile::parse(MIXED).unwrap();
    assert_eq!(file.to_string(), MIXED);
}

/// Format every top-level block
fn format_all(src: &str) -> String {
    let mut file = ConfigFile::parse(src).unwrap();
    for index in 0..file.body().len() {
        file.mark_rewritten(index);
    }
    file.format_rewritten();
    file.to_string()
}

#[test]
fn canonical_input_is_fixed_point() {
    assert_eq!(format_all(MIXED), MIXED);
}

#[test]
fn tabs_round_trip() {
    let src = "locals {\n\ta\t= 1\n\t# tabbed\n\tb =\t\"x\"\t# trailing\n}\n";
    let file = ConfigFile::parse(src).unwrap();
    assert_eq!(file.to_string(), src);
}

#[test]
fn crlf_round_trip() {
    let src = "locals {\r\n  a = 1\r\n\r\n  # note\r\n  b = \"x\"\r\n}\r\n";
    let file = ConfigFile::parse(src).unwrap();
    assert_eq!(file.to_string(), src);
}

#[test]
fn crlf_survives_formatting() {
    let src = "x {\r\n    a=1\r\n  bb = 2\r\n}\r\n";
    assert_eq!(format_all(src), "x {\r\n  a  = 1\r\n  bb = 2\r\n}\r\n");
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,10}"
}

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..100_000).prop_map(|n| n.to_string()),
        "[a-z0-9 .-]{0,12}".prop_map(|s| format!("\"{s}\"")),
        ident().prop_map(|s| format!("var.{s}")),
        Just("true".to_string()),
    ]
}

fn attribute_line() -> impl Strategy<Value = String> {
    (0usize..6, ident(), 0usize..4, literal()).prop_map(|(indent, name, pad, value)| {
        format!("{}{name}{}= {value}\n", " ".repeat(indent), " ".repeat(pad + 1))
    })
}

fn document() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            attribute_line(),
            Just("\n".to_string()),
            Just("# note\n".to_string()),
        ],
        0..12,
    )
    .prop_map(|lines| format!("block \"x\" {{\n{}}}\n", lines.concat()))
}

proptest! {
    #[test]
    fn prop_parse_is_lossless(src in document()) {
        let file = ConfigFile::parse(&src).unwrap();
        prop_assert_eq!(file.to_string(), src);
    }

    #[test]
    fn prop_format_is_idempotent(src in document()) {
        let once = format_all(&src);
        let twice = format_all(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_crlf_is_lossless(src in document()) {
        let src = src.replace('\n', "\r\n");
        let file = ConfigFile::parse(&src).unwrap();
        prop_assert_eq!(file.to_string(), src);
    }
}
