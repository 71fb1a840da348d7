//! Parsed configuration documents

use std::fmt::{self, Display, Formatter};

use hcl_edit::parser::parse_body;
use hcl_edit::repr::Decorate;
use hcl_edit::structure::{Block, Body, Structure};

use crate::error::SyntaxError;
use crate::format::format_block;

/// One configuration file
///
/// Writing the file back reproduces the source exactly, edits aside. Files
/// that end every line with CRLF keep doing so.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    body: Body,
    crlf: bool,
    rewritten: Vec<usize>,
}

impl ConfigFile {
    /// Parse configuration source
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] if the text is not well-formed.
    pub fn parse(src: &str) -> Result<Self, SyntaxError> {
        let crlf = uses_crlf(src);
        let body = if crlf {
            parse_body(&src.replace("\r\n", "\n"))?
        } else {
            parse_body(src)?
        };
        Ok(Self {
            body,
            crlf,
            rewritten: Vec::new(),
        })
    }

    /// Top-level body
    #[inline]
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Top-level body, mutably
    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Insert a new top-level block after a blank line
    ///
    /// The block counts as rewritten.
    pub fn insert_block(&mut self, index: usize, mut block: Block) {
        block.decor_mut().set_prefix("\n");
        self.body.insert(index, block);
        self.mark_rewritten(index);
    }

    /// Record that the top-level structure at `index` was rewritten
    pub fn mark_rewritten(&mut self, index: usize) {
        if !self.rewritten.contains(&index) {
            self.rewritten.push(index);
        }
    }

    /// Indices of rewritten top-level structures, in marking order
    #[inline]
    #[must_use]
    pub fn rewritten(&self) -> &[usize] {
        &self.rewritten
    }

    /// Lay out every rewritten block; the rest of the file is untouched
    pub fn format_rewritten(&mut self) {
        for &index in &self.rewritten {
            if index >= self.body.len() {
                continue;
            }
            match self.body.remove(index) {
                Structure::Block(mut block) => {
                    format_block(&mut block);
                    self.body.insert(index, block);
                }
                other => self.body.insert(index, other),
            }
        }
    }
}

impl Display for ConfigFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = self.body.to_string();
        if self.crlf {
            f.write_str(&text.replace('\n', "\r\n"))
        } else {
            f.write_str(&text)
        }
    }
}

/// Every line break is CRLF
fn uses_crlf(src: &str) -> bool {
    let breaks = src.matches('\n').count();
    breaks > 0 && src.matches("\r\n").count() == breaks
}

/// Parse a single block, for migrators that emit new resources
///
/// # Errors
///
/// Returns [`SyntaxError`] if the text does not parse or holds no block.
pub fn parse_block(src: &str) -> Result<Block, SyntaxError> {
    parse_body(src)?
        .into_iter()
        .find_map(|structure| match structure {
            Structure::Block(block) => Some(block),
            Structure::Attribute(_) => None,
        })
        .ok_or_else(|| SyntaxError::new(1, 1, "expected a block"))
}
