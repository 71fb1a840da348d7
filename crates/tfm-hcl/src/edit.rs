//! Config Tree Primitives
//!
//! Structural edits on a parsed body. Value expressions are moved around whole
//! and never evaluated; the only expression rewrites are [`rename_object_keys`]
//! and [`rename_references`], both narrow visitors.
//!
//! Removing a structure hands the blank lines and comment lines in front of it
//! to the structure that follows, so surrounding layout survives the edit.

use hcl_edit::expr::{Expression, Object, ObjectKey, Traversal, TraversalOperator};
use hcl_edit::parser::parse_expr;
use hcl_edit::repr::{Decorate, Decorated, Formatted};
use hcl_edit::structure::{Attribute, Block, BlockLabel, Body, Structure};
use hcl_edit::visit_mut::{visit_object_mut, visit_traversal_mut, VisitMut};
use hcl_edit::{Ident, Number};

use crate::error::{EditError, SyntaxError};
use crate::format::{line_indent, map_entries, prefix, structure_decor, structure_decor_mut};

/// Block type, e.g. `resource`
#[must_use]
pub fn block_type(block: &Block) -> &str {
    block.ident.value().as_str()
}

/// Label at `index` as plain text
#[must_use]
pub fn block_label(block: &Block, index: usize) -> Option<&str> {
    block.labels.get(index).map(|label| match label {
        BlockLabel::String(s) => s.value().as_str(),
        BlockLabel::Ident(ident) => ident.value().as_str(),
    })
}

/// Dotted address of a block: type followed by its labels
#[must_use]
pub fn block_address(block: &Block) -> String {
    let mut address = block_type(block).to_string();
    for index in 0..block.labels.len() {
        if let Some(label) = block_label(block, index) {
            address.push('.');
            address.push_str(label);
        }
    }
    address
}

/// Replace the first label of `block` when it equals `old`
///
/// Returns `true` if the label was changed.
pub fn rename_resource_type(block: &mut Block, old: &str, new: &str) -> bool {
    if block_label(block, 0) != Some(old) {
        return false;
    }
    let decor = match &block.labels[0] {
        BlockLabel::String(s) => s.decor().clone(),
        BlockLabel::Ident(ident) => ident.decor().clone(),
    };
    let mut label = Decorated::new(new.to_string());
    *label.decor_mut() = decor;
    block.labels[0] = BlockLabel::String(label);
    tracing::debug!(from = old, to = new, "renamed resource type");
    true
}

/// Integer literal
#[must_use]
pub fn number(value: i64) -> Expression {
    Expression::Number(Formatted::new(Number::from(value)))
}

/// Quoted string literal
#[must_use]
pub fn string(value: &str) -> Expression {
    Expression::String(Decorated::new(value.to_string()))
}

/// Rename attribute `old` to `new`, leaving its value untouched
///
/// Does nothing if `old` is absent or `new` already exists.
///
/// # Errors
///
/// Returns [`EditError::InvalidIdentifier`] if `new` is not an identifier.
pub fn rename_attribute(body: &mut Body, old: &str, new: &str) -> Result<bool, EditError> {
    if body.has_attribute(new) || !body.has_attribute(old) {
        return Ok(false);
    }
    let key = ident(new)?;
    Ok(update_attribute(body, old, |attr| *attr.key.value_mut() = key))
}

/// Append `name = default` unless an attribute `name` exists
///
/// Returns `true` if the attribute was added.
///
/// # Errors
///
/// Returns [`EditError::InvalidIdentifier`] if `name` is not an identifier.
pub fn ensure_attribute(body: &mut Body, name: &str, default: Expression) -> Result<bool, EditError> {
    if body.has_attribute(name) {
        return Ok(false);
    }
    let indent = sibling_indent(body);
    body.push(new_attribute(name, default, &indent)?);
    Ok(true)
}

/// Set `name = value`, replacing an existing value in place or appending
///
/// # Errors
///
/// Returns [`EditError::InvalidIdentifier`] if `name` is not an identifier.
pub fn set_attribute(body: &mut Body, name: &str, value: Expression) -> Result<(), EditError> {
    if body.has_attribute(name) {
        update_attribute(body, name, |attr| replace_value(attr, value));
        return Ok(());
    }
    let indent = sibling_indent(body);
    body.push(new_attribute(name, value, &indent)?);
    Ok(())
}

/// Edit attribute `name` in place
///
/// Returns `false` if there is no such attribute.
pub fn update_attribute(body: &mut Body, name: &str, f: impl FnOnce(&mut Attribute)) -> bool {
    let Some(index) = body.iter().position(|s| is_attribute(s, name)) else {
        return false;
    };
    match body.remove(index) {
        Structure::Attribute(mut attr) => {
            f(&mut attr);
            body.insert(index, attr);
            true
        }
        other => {
            body.insert(index, other);
            false
        }
    }
}

/// Remove each listed attribute that exists, returning how many were removed
pub fn remove_attributes(body: &mut Body, names: &[&str]) -> usize {
    let mut removed = 0;
    for name in names {
        let found = body.iter().position(|s| is_attribute(s, name));
        if let Some(index) = found {
            detach(body, index);
            removed += 1;
        }
    }
    removed
}

/// First nested block of `block_type`
pub fn find_block_by_type<'a>(body: &'a mut Body, block_type: &'a str) -> Option<&'a mut Block> {
    body.get_blocks_mut(block_type).next()
}

/// Value of a plain string attribute; `None` for references or templates
#[must_use]
pub fn extract_string_from_attribute(attr: &Attribute) -> Option<String> {
    match &attr.value {
        Expression::String(s) => Some(s.value().clone()),
        _ => None,
    }
}

/// Replace repeated `block_type { ... }` blocks with `attr_name = { ... }`
///
/// `callback` runs on every matching block before conversion. Only the first
/// block becomes the attribute; any further blocks are dropped. The attribute
/// replaces an existing `attr_name` in place or is appended at the end of the
/// body. Returns the number of blocks found, so callers can report drops.
///
/// # Errors
///
/// Returns [`EditError::NestedBlocks`] if the first block still contains
/// nested blocks; the body is left unchanged in that case.
pub fn convert_blocks_to_attribute(
    body: &mut Body,
    block_type: &str,
    attr_name: &str,
    mut callback: impl FnMut(&mut Block),
) -> Result<usize, EditError> {
    ident(attr_name)?;
    let mut blocks = blocks_of_type(body, block_type);
    let Some(first) = blocks.first_mut() else {
        return Ok(0);
    };
    callback(first);
    ensure_flat(first)?;
    let leftover = first_block_prefix(body, block_type);
    let expr = object_expression(&first.body, line_indent(&leftover))?;
    for extra in blocks.iter_mut().skip(1) {
        callback(extra);
    }

    let found = blocks.len();
    if found > 1 {
        tracing::warn!(block_type, found, "multiple blocks converted; kept the first");
    }
    let leftover = remove_blocks(body, block_type).unwrap_or(leftover);
    place_attribute(body, attr_name, expr, &leftover)?;
    Ok(found)
}

/// Convert a cardinality-one block to attribute syntax
///
/// Nested blocks must already have been converted; run innermost first.
/// Returns `true` if a block was converted.
///
/// # Errors
///
/// Returns [`EditError::NestedBlocks`] if the block still contains blocks.
pub fn convert_single_block_to_attribute(
    body: &mut Body,
    block_type: &str,
    attr_name: &str,
) -> Result<bool, EditError> {
    convert_blocks_to_attribute(body, block_type, attr_name, |_| {}).map(|found| found > 0)
}

/// Replace repeated blocks with a list of object literals
///
/// `ipv4 { ip = "a" }` `ipv4 { ip = "b" }` becomes `ipv4 = [{ ip = "a" }, { ip = "b" }]`
/// laid out one object per line. Returns the number of blocks converted.
///
/// # Errors
///
/// Returns [`EditError::NestedBlocks`] if any block still contains blocks.
pub fn convert_blocks_to_list_attribute(
    body: &mut Body,
    block_type: &str,
    attr_name: &str,
) -> Result<usize, EditError> {
    ident(attr_name)?;
    let blocks = blocks_of_type(body, block_type);
    if blocks.is_empty() {
        return Ok(0);
    }
    for block in &blocks {
        ensure_flat(block)?;
    }

    let leftover = first_block_prefix(body, block_type);
    let indent = line_indent(&leftover).to_string();
    let item_indent = format!("{indent}  ");
    let items: String = blocks
        .iter()
        .map(|block| format!("{item_indent}{},\n", object_text(&block.body, &item_indent)))
        .collect();
    let expr = parse_expr(&format!("[\n{items}{indent}]")).map_err(SyntaxError::from)?;

    let leftover = remove_blocks(body, block_type).unwrap_or(leftover);
    place_attribute(body, attr_name, expr, &leftover)?;
    Ok(blocks.len())
}

/// Copy `attr_name` from the first `block_type` block into `body`
///
/// The nested attribute is left in place. Returns `true` if copied.
///
/// # Errors
///
/// Returns [`EditError::InvalidIdentifier`] if `attr_name` is not an identifier.
pub fn hoist_attribute_from_block(
    body: &mut Body,
    block_type: &str,
    attr_name: &str,
) -> Result<bool, EditError> {
    let Some(value) = body
        .get_blocks(block_type)
        .next()
        .and_then(|b| b.body.get_attribute(attr_name))
        .map(|a| a.value.clone())
    else {
        return Ok(false);
    };
    set_attribute(body, attr_name, value)?;
    Ok(true)
}

/// Rename object keys inside an expression whose shape is not known statically
///
/// Only identifier keys are renamed, in objects at any depth that do not already
/// hold `new`. Values, comparisons, and references that happen to contain the
/// same identifier are not touched. Returns the number of keys renamed.
pub fn rename_object_keys(expr: &mut Expression, old: &str, new: &str) -> usize {
    let Ok(new) = Ident::try_new(new) else {
        return 0;
    };
    let mut renamer = KeyRenamer { old, new, renamed: 0 };
    renamer.visit_expr_mut(expr);
    renamer.renamed
}

/// Rewrite references `old.<name>` to `new.<name>` in one expression
///
/// Matches a root variable `old` followed by an attribute access, including
/// inside `${ }` interpolations of quoted templates and heredocs. `var.old.x`
/// is not a reference to `old` and is left alone.
pub fn rename_references_in_expression(expr: &mut Expression, old: &str, new: &str) -> usize {
    let Some(mut renamer) = ReferenceRenamer::new(old, new) else {
        return 0;
    };
    renamer.visit_expr_mut(expr);
    renamer.renamed
}

/// Rewrite references in every attribute of `body`, recursively
pub fn rename_references(body: &mut Body, old: &str, new: &str) -> usize {
    let Some(mut renamer) = ReferenceRenamer::new(old, new) else {
        return 0;
    };
    renamer.visit_body_mut(body);
    renamer.renamed
}

struct KeyRenamer<'a> {
    old: &'a str,
    new: Ident,
    renamed: usize,
}

impl VisitMut for KeyRenamer<'_> {
    fn visit_object_mut(&mut self, node: &mut Object) {
        let has = |object: &Object, name: &str| object.iter().any(|(key, _)| key_is(key, name));
        if has(node, self.old) && !has(node, self.new.as_str()) {
            map_entries(node, |mut key, value| {
                if let ObjectKey::Ident(ident) = &mut key {
                    if ident.value().as_str() == self.old {
                        *ident.value_mut() = self.new.clone();
                        self.renamed += 1;
                    }
                }
                (key, value)
            });
        }
        visit_object_mut(self, node);
    }
}

struct ReferenceRenamer<'a> {
    old: &'a str,
    new: Ident,
    renamed: usize,
}

impl<'a> ReferenceRenamer<'a> {
    fn new(old: &'a str, new: &str) -> Option<Self> {
        match Ident::try_new(new) {
            Ok(new) => Some(Self { old, new, renamed: 0 }),
            Err(_) => {
                tracing::warn!(name = new, "invalid reference name; nothing renamed");
                None
            }
        }
    }
}

impl VisitMut for ReferenceRenamer<'_> {
    fn visit_traversal_mut(&mut self, node: &mut Traversal) {
        let attr_access = matches!(
            node.operators.first().map(|op| op.value()),
            Some(TraversalOperator::GetAttr(_))
        );
        if let Expression::Variable(root) = &mut node.expr {
            if attr_access && root.value().as_str() == self.old {
                *root.value_mut() = self.new.clone();
                self.renamed += 1;
            }
        }
        visit_traversal_mut(self, node);
    }
}

fn key_is(key: &ObjectKey, name: &str) -> bool {
    matches!(key, ObjectKey::Ident(ident) if ident.value().as_str() == name)
}

fn ident(name: &str) -> Result<Ident, EditError> {
    Ident::try_new(name).map_err(|_| EditError::InvalidIdentifier(name.to_string()))
}

fn is_attribute(structure: &Structure, name: &str) -> bool {
    matches!(structure, Structure::Attribute(attr) if attr.key.value().as_str() == name)
}

fn is_block(structure: &Structure, block_type: &str) -> bool {
    matches!(structure, Structure::Block(block) if self::block_type(block) == block_type)
}

fn blocks_of_type(body: &Body, block_type: &str) -> Vec<Block> {
    body.get_blocks(block_type).cloned().collect()
}

fn ensure_flat(block: &Block) -> Result<(), EditError> {
    let nested: Vec<String> = block
        .body
        .iter()
        .filter_map(|s| match s {
            Structure::Block(inner) => Some(self::block_type(inner).to_string()),
            Structure::Attribute(_) => None,
        })
        .collect();
    if nested.is_empty() {
        return Ok(());
    }
    Err(EditError::NestedBlocks {
        block_type: block_type(block).to_string(),
        nested,
    })
}

/// Keep the value's surrounding whitespace and comments, swap the value
fn replace_value(attr: &mut Attribute, value: Expression) {
    let decor = attr.value.decor().clone();
    attr.value = value;
    *attr.value.decor_mut() = decor;
}

/// Indentation of the structures already in `body`
fn sibling_indent(body: &Body) -> String {
    body.iter().last().map_or_else(
        || "  ".to_string(),
        |last| line_indent(prefix(structure_decor(last))).to_string(),
    )
}

fn new_attribute(name: &str, mut value: Expression, prefix: &str) -> Result<Attribute, EditError> {
    let mut key = Decorated::new(ident(name)?);
    key.decor_mut().set_suffix(" ");
    value.decor_mut().set_prefix(" ");
    let mut attr = Attribute::new(key, value);
    attr.decor_mut().set_prefix(prefix.to_string());
    Ok(attr)
}

fn first_block_prefix(body: &Body, block_type: &str) -> String {
    body.iter()
        .find(|s| is_block(s, block_type))
        .map(|s| prefix(structure_decor(s)).to_string())
        .unwrap_or_default()
}

/// Remove every `block_type` block, returning what is left of the first one's prefix
fn remove_blocks(body: &mut Body, block_type: &str) -> Option<String> {
    let indices: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, s)| is_block(s, block_type))
        .map(|(i, _)| i)
        .collect();
    let mut leftover = None;
    for &index in indices.iter().rev() {
        let removed = detach(body, index);
        leftover = Some(prefix(structure_decor(&removed)).to_string());
    }
    leftover
}

/// Replace `name` in place, or append it with the given prefix
fn place_attribute(body: &mut Body, name: &str, value: Expression, leftover: &str) -> Result<(), EditError> {
    if body.has_attribute(name) {
        update_attribute(body, name, |attr| replace_value(attr, value));
        return Ok(());
    }
    let leftover = if leftover.is_empty() {
        sibling_indent(body)
    } else {
        leftover.to_string()
    };
    body.push(new_attribute(name, value, &leftover)?);
    Ok(())
}

/// Remove the structure at `index`
///
/// Blank and comment lines in front of it move to the next structure. With no
/// next structure they stay on the removed one, for the caller to reuse.
fn detach(body: &mut Body, index: usize) -> Structure {
    let mut removed = body.remove(index);
    if index >= body.len() {
        return removed;
    }
    let text = prefix(structure_decor(&removed)).to_string();
    if let Some(pos) = text.rfind('\n') {
        let (head, tail) = text.split_at(pos + 1);
        let mut next = body.remove(index);
        let merged = format!("{head}{}", prefix(structure_decor(&next)));
        structure_decor_mut(&mut next).set_prefix(merged);
        body.insert(index, next);
        structure_decor_mut(&mut removed).set_prefix(tail.to_string());
    }
    removed
}

/// Object literal text for a block body; `indent` is the closing brace's
fn object_text(body: &Body, indent: &str) -> String {
    let text = body.to_string();
    let inner = text.trim_end();
    let lead = inner.len() - inner.trim_start().len();
    let start = inner[..lead].rfind('\n').map_or(0, |pos| pos + 1);
    let inner = &inner[start..];
    if inner.is_empty() {
        return "{}".to_string();
    }
    format!("{{\n{inner}\n{indent}}}")
}

fn object_expression(body: &Body, indent: &str) -> Result<Expression, EditError> {
    let expr = parse_expr(&object_text(body, indent)).map_err(SyntaxError::from)?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigFile;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> ConfigFile {
        ConfigFile::parse(src).unwrap()
    }

    fn expr(src: &str) -> Expression {
        parse_expr(src).unwrap()
    }

    fn formatted(mut file: ConfigFile) -> String {
        file.mark_rewritten(0);
        file.format_rewritten();
        file.to_string()
    }

    fn first<'a>(file: &'a mut ConfigFile, block_type: &'a str) -> &'a mut Body {
        &mut find_block_by_type(file.body_mut(), block_type).unwrap().body
    }

    #[test]
    fn block_address_joins_labels() {
        let file = parse("resource \"cloudflare_record\" \"www\" {\n}\n");
        let block = file.body().get_blocks("resource").next().unwrap();
        assert_eq!(block_type(block), "resource");
        assert_eq!(block_label(block, 1), Some("www"));
        assert_eq!(block_label(block, 2), None);
        assert_eq!(block_address(block), "resource.cloudflare_record.www");
    }

    #[test]
    fn rename_resource_type_only_matching_label() {
        let mut file = parse("resource  \"cloudflare_record\"   \"www\" {\n}\n");
        let block = find_block_by_type(file.body_mut(), "resource").unwrap();
        assert!(!rename_resource_type(block, "other", "x"));
        assert!(rename_resource_type(block, "cloudflare_record", "cloudflare_dns_record"));
        assert_eq!(file.to_string(), "resource  \"cloudflare_dns_record\"   \"www\" {\n}\n");
    }

    #[test]
    fn rename_attribute_keeps_expression_bytes() {
        let mut file = parse("value = lookup(var.m, \"k\",  \"d\") # note\n");
        assert!(rename_attribute(file.body_mut(), "value", "content").unwrap());
        assert_eq!(file.to_string(), "content = lookup(var.m, \"k\",  \"d\") # note\n");
        assert!(!rename_attribute(file.body_mut(), "value", "content").unwrap());
    }

    #[test]
    fn rename_attribute_refuses_collision() {
        let mut file = parse("a = 1\nb = 2\n");
        assert!(!rename_attribute(file.body_mut(), "a", "b").unwrap());
    }

    #[test]
    fn rename_attribute_rejects_bad_identifier() {
        let mut file = parse("a = 1\n");
        assert_eq!(
            rename_attribute(file.body_mut(), "a", "not valid"),
            Err(EditError::InvalidIdentifier("not valid".into()))
        );
    }

    #[test]
    fn ensure_attribute_appends_once() {
        let mut file = parse("x {\n    a = 1\n}\n");
        let body = first(&mut file, "x");
        assert!(ensure_attribute(body, "ttl", number(1)).unwrap());
        assert!(!ensure_attribute(body, "ttl", number(5)).unwrap());
        assert_eq!(file.to_string(), "x {\n    a = 1\n    ttl = 1\n}\n");
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut file = parse("a   = 1 # one\nb = 2\n");
        set_attribute(file.body_mut(), "a", string("x")).unwrap();
        set_attribute(file.body_mut(), "c", number(3)).unwrap();
        assert_eq!(file.to_string(), "a   = \"x\" # one\nb = 2\nc = 3\n");
    }

    #[test]
    fn remove_attributes_counts() {
        let mut file = parse("a = 1\nhostname = \"h\"\nb = 2\n");
        assert_eq!(remove_attributes(file.body_mut(), &["hostname", "allow_overwrite"]), 1);
        assert_eq!(file.to_string(), "a = 1\nb = 2\n");
    }

    #[test]
    fn removal_hands_blank_lines_to_next() {
        let mut file = parse("a = 1\n\n# old\nvalue = 2\nb = 3\n");
        assert_eq!(remove_attributes(file.body_mut(), &["value"]), 1);
        assert_eq!(file.to_string(), "a = 1\n\n# old\nb = 3\n");
    }

    #[test]
    fn convert_blocks_first_wins() {
        let src = "r {\n  data {\n    a = 1\n  }\n  data {\n    a = 2\n  }\n}\n";
        let mut file = parse(src);
        let mut seen = 0;
        let found =
            convert_blocks_to_attribute(first(&mut file, "r"), "data", "data", |_| seen += 1).unwrap();
        assert_eq!((found, seen), (2, 2));
        assert_eq!(formatted(file), "r {\n  data = {\n    a = 1\n  }\n}\n");
    }

    #[test]
    fn convert_blocks_callback_edits_before_conversion() {
        let src = "r {\n  data {\n    content = \"x\"\n  }\n}\n";
        let mut file = parse(src);
        convert_blocks_to_attribute(first(&mut file, "r"), "data", "data", |b| {
            rename_attribute(&mut b.body, "content", "value").unwrap();
        })
        .unwrap();
        assert_eq!(formatted(file), "r {\n  data = {\n    value = \"x\"\n  }\n}\n");
    }

    #[test]
    fn convert_keeps_blank_line_before_block() {
        let src = "r {\n  a = 1\n\n  data {\n    b = 2\n  }\n}\n";
        let mut file = parse(src);
        convert_single_block_to_attribute(first(&mut file, "r"), "data", "data").unwrap();
        assert_eq!(file.to_string(), "r {\n  a = 1\n\n  data = {\n    b = 2\n  }\n}\n");
    }

    #[test]
    fn convert_single_block_requires_bottom_up() {
        let src = "r {\n  outer {\n    inner {\n      a = 1\n    }\n  }\n}\n";
        let mut file = parse(src);
        let body = first(&mut file, "r");
        let before = body.to_string();
        assert!(matches!(
            convert_single_block_to_attribute(body, "outer", "outer"),
            Err(EditError::NestedBlocks { .. })
        ));
        assert_eq!(body.to_string(), before);

        let outer = find_block_by_type(body, "outer").unwrap();
        assert!(convert_single_block_to_attribute(&mut outer.body, "inner", "inner").unwrap());
        assert!(convert_single_block_to_attribute(body, "outer", "outer").unwrap());
        assert_eq!(
            formatted(file),
            "r {\n  outer = {\n    inner = {\n      a = 1\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn convert_blocks_to_list() {
        let src = "d {\n  ipv4 {\n    ip = \"1.1.1.1\"\n  }\n  ipv4 {\n    ip = \"2.2.2.2\"\n    port = 53\n  }\n}\n";
        let mut file = parse(src);
        assert_eq!(convert_blocks_to_list_attribute(first(&mut file, "d"), "ipv4", "ipv4").unwrap(), 2);
        assert_eq!(
            formatted(file),
            "d {\n  ipv4 = [\n    {\n      ip = \"1.1.1.1\"\n    },\n    {\n      ip   = \"2.2.2.2\"\n      port = 53\n    },\n  ]\n}\n"
        );
    }

    #[test]
    fn hoist_copies_without_removing() {
        let src = "r {\n  data {\n    priority = 10\n  }\n}\n";
        let mut file = parse(src);
        let body = first(&mut file, "r");
        assert!(hoist_attribute_from_block(body, "data", "priority").unwrap());
        assert!(!hoist_attribute_from_block(body, "data", "missing").unwrap());
        assert!(body.has_attribute("priority"));
        let data = body.get_blocks("data").next().unwrap();
        assert!(data.body.has_attribute("priority"));
    }

    #[test]
    fn extract_string_literal_only() {
        let file = parse("a = \"MX\"\nb = var.t\nc = \"${var.t}\"\n");
        let get = |name| file.body().get_attribute(name).unwrap();
        assert_eq!(extract_string_from_attribute(get("a")).as_deref(), Some("MX"));
        assert_eq!(extract_string_from_attribute(get("b")), None);
        assert_eq!(extract_string_from_attribute(get("c")), None);
    }

    #[test]
    fn rename_object_keys_only_keys() {
        let mut value = expr("{ content = var.content, tag = content == \"x\" ? 1 : 2 }");
        assert_eq!(rename_object_keys(&mut value, "content", "value"), 1);
        assert_eq!(
            value.to_string(),
            "{ value = var.content, tag = content == \"x\" ? 1 : 2 }"
        );
    }

    #[test]
    fn rename_object_keys_keeps_comments_and_nests() {
        let mut value = expr("{\n  content /* old */ = \"a\"\n  inner = { content = 1 }\n}");
        assert_eq!(rename_object_keys(&mut value, "content", "value"), 2);
        assert_eq!(
            value.to_string(),
            "{\n  value /* old */ = \"a\"\n  inner = { value = 1 }\n}"
        );
    }

    #[test]
    fn rename_object_keys_skips_collision() {
        let mut value = expr("{ content = 1, value = 2 }");
        assert_eq!(rename_object_keys(&mut value, "content", "value"), 0);
    }

    #[test]
    fn rename_references_roots_and_templates() {
        let mut value = expr(
            "[cloudflare_record.www.id, \"${cloudflare_record.api.name}-x\", var.cloudflare_record.y]",
        );
        assert_eq!(
            rename_references_in_expression(&mut value, "cloudflare_record", "cloudflare_dns_record"),
            2
        );
        assert_eq!(
            value.to_string(),
            "[cloudflare_dns_record.www.id, \"${cloudflare_dns_record.api.name}-x\", var.cloudflare_record.y]"
        );
    }

    #[test]
    fn escaped_interpolation_is_literal_text() {
        let mut value = expr("\"cloudflare_record.x $${cloudflare_record.y}\"");
        assert_eq!(rename_references_in_expression(&mut value, "cloudflare_record", "n"), 0);
    }

    #[test]
    fn rename_references_recurses_into_blocks() {
        let mut file = parse(
            "resource \"a\" \"b\" {\n  depends_on = [cloudflare_record.x]\n  inner {\n    v = cloudflare_record.y.id\n  }\n}\n",
        );
        assert_eq!(rename_references(file.body_mut(), "cloudflare_record", "cloudflare_dns_record"), 2);
        assert!(file.to_string().contains("cloudflare_dns_record.y.id"));
    }
}
