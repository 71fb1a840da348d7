//! Error types for configuration parsing and editing

/// Malformed configuration text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at {line}:{column}: {message}")]
pub struct SyntaxError {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// What went wrong
    pub message: String,
}

impl SyntaxError {
    /// Create syntax error at position
    #[inline]
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl From<hcl_edit::parser::Error> for SyntaxError {
    fn from(err: hcl_edit::parser::Error) -> Self {
        let location = err.location();
        Self::new(location.line(), location.column(), err.message())
    }
}

/// Config primitive failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Block still holds nested blocks and cannot become an object literal
    #[error("block `{block_type}` contains nested blocks: {nested:?}")]
    NestedBlocks {
        /// Type of the block being converted
        block_type: String,
        /// Types of the nested blocks that remain
        nested: Vec<String>,
    },

    /// Generated expression text failed to parse
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] SyntaxError),

    /// Identifier is not a valid attribute or block name
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
}
