//! Canonical layout for rewritten blocks
//!
//! Only blocks a migrator changed are laid out; the rest of a file is written
//! back exactly as parsed. Inside such a block:
//!
//! 1. indentation: two spaces per nesting level, own-line comments included
//! 2. spacing: one space after `=`, blank lines hold no whitespace
//! 3. alignment: `=` lined up across runs of consecutive single-line attributes
//!
//! A blank line, a comment line, a nested block, or a multi-line value ends an
//! alignment run. Expressions and inline comments are left as they are.

use hcl_edit::expr::{Array, Expression, Object, ObjectKey, ObjectValue, ObjectValueTerminator};
use hcl_edit::repr::{Decor, Decorate};
use hcl_edit::structure::{Block, Body, Structure};

const INDENT: &str = "  ";

/// Lay out a top-level block and everything nested in it
pub fn format_block(block: &mut Block) {
    format_body(&mut block.body, 1);
}

/// Text in front of a node; empty when never set
pub(crate) fn prefix(decor: &Decor) -> &str {
    decor.prefix().map_or("", |raw| &**raw)
}

fn suffix(decor: &Decor) -> &str {
    decor.suffix().map_or("", |raw| &**raw)
}

pub(crate) fn structure_decor(structure: &Structure) -> &Decor {
    match structure {
        Structure::Attribute(attr) => attr.decor(),
        Structure::Block(block) => block.decor(),
    }
}

pub(crate) fn structure_decor_mut(structure: &mut Structure) -> &mut Decor {
    match structure {
        Structure::Attribute(attr) => attr.decor_mut(),
        Structure::Block(block) => block.decor_mut(),
    }
}

/// Leading whitespace of the last line of `text`
pub(crate) fn line_indent(text: &str) -> &str {
    let tail = text.rfind('\n').map_or(text, |pos| &text[pos + 1..]);
    &tail[..tail.len() - tail.trim_start().len()]
}

/// Rebuild an object entry by entry, keeping its decor and closing text
///
/// Object keys are immutable in place, so renames and key decor changes go
/// through a rebuild.
pub(crate) fn map_entries(
    object: &mut Object,
    mut f: impl FnMut(ObjectKey, ObjectValue) -> (ObjectKey, ObjectValue),
) {
    let decor = object.decor().clone();
    let trailing = object.trailing().clone();
    let mut rebuilt = Object::new();
    for (key, value) in std::mem::take(object) {
        let (key, value) = f(key, value);
        rebuilt.insert(key, value);
    }
    rebuilt.set_trailing(trailing);
    *rebuilt.decor_mut() = decor;
    *object = rebuilt;
}

/// Re-indent the text in front of a node that starts its own line
///
/// Blank lines are emptied, `#` and `//` comment lines move to `depth`, and the
/// node's own indentation becomes `depth` unless it holds an inline comment.
fn reindent(text: &str, depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    let (head, tail) = match text.rfind('\n') {
        Some(pos) => text.split_at(pos + 1),
        None => ("", text),
    };

    let mut out = String::with_capacity(text.len() + pad.len());
    for line in head.split_inclusive('\n') {
        let content = line.trim();
        if content.is_empty() {
            out.push('\n');
        } else if content.starts_with('#') || content.starts_with("//") {
            out.push_str(&pad);
            out.push_str(content);
            out.push('\n');
        } else {
            out.push_str(line);
        }
    }
    if tail.trim().is_empty() {
        out.push_str(&pad);
    } else {
        out.push_str(tail);
    }
    out
}

fn single_line(expr: &Expression) -> bool {
    !expr.to_string().contains('\n')
}

/// Pad between a key and `=`; comments there are kept
fn pad_key(decor: &mut Decor, spaces: usize) {
    if suffix(decor).trim().is_empty() {
        decor.set_suffix(" ".repeat(spaces));
    }
}

/// Exactly one space after `=`; comments there are kept
fn space_value(expr: &mut Expression) {
    if prefix(expr.decor()).trim().is_empty() {
        expr.decor_mut().set_prefix(" ");
    }
}

/// One line-starting item, as seen by alignment
#[derive(Debug, Clone, Copy)]
struct Cell {
    /// Key width when the item is a single-line assignment
    key_len: Option<usize>,
    /// Preceded by a blank or comment line
    new_run: bool,
}

/// Alignment width for every cell that belongs to a run
fn align(cells: &[Cell]) -> Vec<Option<usize>> {
    let mut widths = vec![None; cells.len()];
    let mut start = 0;
    for end in 0..=cells.len() {
        let next = cells.get(end);
        if next.is_some_and(|c| c.key_len.is_some() && !c.new_run) {
            continue;
        }
        let width = cells[start..end].iter().filter_map(|c| c.key_len).max();
        widths[start..end].fill(width);
        start = match next {
            Some(c) if c.key_len.is_none() => end + 1,
            _ => end,
        };
    }
    widths
}

fn format_body(body: &mut Body, depth: usize) {
    let cells: Vec<Cell> = body
        .iter()
        .map(|structure| {
            let text = prefix(structure_decor(structure));
            let key_len = match structure {
                Structure::Attribute(attr) if single_line(&attr.value) => {
                    Some(attr.key.value().as_str().len())
                }
                _ => None,
            };
            Cell {
                key_len,
                new_run: text.contains('\n') || !text.trim().is_empty(),
            }
        })
        .collect();

    for (index, width) in align(&cells).into_iter().enumerate() {
        let mut structure = body.remove(index);
        let text = reindent(prefix(structure_decor(&structure)), depth);
        structure_decor_mut(&mut structure).set_prefix(text);
        match &mut structure {
            Structure::Attribute(attr) => {
                let len = attr.key.value().as_str().len();
                pad_key(attr.key.decor_mut(), width.map_or(1, |w| w + 1 - len));
                space_value(&mut attr.value);
                format_expr(&mut attr.value, depth);
            }
            Structure::Block(block) => format_body(&mut block.body, depth + 1),
        }
        body.insert(index, structure);
    }
}

/// Lay out a multi-line value whose first line sits at `depth`
fn format_expr(expr: &mut Expression, depth: usize) {
    if single_line(expr) {
        return;
    }
    match expr {
        Expression::Object(object) => format_object(object, depth),
        Expression::Array(array) => format_array(array, depth),
        _ => {}
    }
}

fn key_len(key: &ObjectKey) -> usize {
    match key {
        ObjectKey::Ident(ident) => ident.value().as_str().len(),
        ObjectKey::Expression(expr) => expr.to_string().trim().len(),
    }
}

fn ends_line(value: &ObjectValue) -> bool {
    matches!(value.terminator(), ObjectValueTerminator::Newline)
}

fn format_object(object: &mut Object, depth: usize) {
    // The line break after `{` lives in the first key's prefix; later breaks
    // are value terminators.
    let mut after_newline = false;
    let cells: Vec<Cell> = object
        .iter()
        .map(|(key, value)| {
            let text = prefix(key.decor());
            let breaks = text.matches('\n').count() + usize::from(after_newline);
            let starts_line = breaks > 0;
            after_newline = ends_line(value);
            Cell {
                key_len: (starts_line && single_line(value.expr())).then(|| key_len(key)),
                new_run: breaks > 1 || !text.trim().is_empty(),
            }
        })
        .collect();
    let mut widths = align(&cells).into_iter();

    let mut after_newline = false;
    map_entries(object, |mut key, mut value| {
        let width = widths.next().flatten();
        let text = prefix(key.decor());
        if after_newline || text.contains('\n') {
            let text = reindent(text, depth + 1);
            key.decor_mut().set_prefix(text);
            let len = key_len(&key);
            pad_key(key.decor_mut(), width.map_or(1, |w| w + 1 - len));
            space_value(value.expr_mut());
        }
        format_expr(value.expr_mut(), depth + 1);
        after_newline = ends_line(&value);
        (key, value)
    });

    let trailing = String::from(&**object.trailing());
    if after_newline || trailing.contains('\n') {
        object.set_trailing(reindent(&trailing, depth));
    }
}

fn format_array(array: &mut Array, depth: usize) {
    for element in array.iter_mut() {
        let text = prefix(element.decor());
        let reindented = text.contains('\n').then(|| reindent(text, depth + 1));
        if let Some(text) = reindented {
            element.decor_mut().set_prefix(text);
        }
        format_expr(element, depth + 1);
    }

    let trailing = String::from(&**array.trailing());
    if trailing.contains('\n') {
        array.set_trailing(reindent(&trailing, depth));
    }
}
