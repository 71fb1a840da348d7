//! Error types for the migration engine
//!
//! Severity maps onto types:
//! - [`PipelineError`]: fatal, the document is not migrated
//! - [`MigrationError`]: one migrator call failed; recorded as an error diagnostic
//! - [`RegistryError`]: invalid registration at startup

use tfm_hcl::{EditError, SyntaxError};
use tfm_state::StateError;

/// Failure of a single migrator transform
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MigrationError {
    /// State primitive failed
    #[error("state edit failed: {0}")]
    State(#[from] StateError),

    /// Config primitive failed
    #[error("config edit failed: {0}")]
    Edit(#[from] EditError),

    /// Input does not have the shape the migrator expects
    #[error("invalid {what}: {reason}")]
    Invalid {
        /// Kind of input (`instance`, `block`)
        what: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl MigrationError {
    /// Create invalid-instance error
    #[inline]
    pub fn invalid_instance(reason: impl Into<String>) -> Self {
        Self::Invalid {
            what: "instance",
            reason: reason.into(),
        }
    }

    /// Create invalid-block error
    #[inline]
    pub fn invalid_block(reason: impl Into<String>) -> Self {
        Self::Invalid {
            what: "block",
            reason: reason.into(),
        }
    }
}

/// Fatal failure for one document
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Document has no content
    #[error("document is empty")]
    EmptyContent,

    /// State document is not valid JSON
    #[error("invalid state document: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Configuration document does not parse
    #[error("invalid configuration: {0}")]
    Syntax(#[from] SyntaxError),

    /// Writing the migrated state document failed
    #[error("failed to serialize state document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A handler ran without the scratch tree it depends on
    #[error("handler '{handler}' requires a parsed {document} document")]
    MissingDocument {
        /// Handler name
        handler: &'static str,
        /// `state` or `configuration`
        document: &'static str,
    },
}

impl PipelineError {
    /// Create missing-document error
    #[inline]
    #[must_use]
    pub fn missing_document(handler: &'static str, document: &'static str) -> Self {
        Self::MissingDocument { handler, document }
    }
}

/// Registration failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A migrator is already registered for this key
    #[error("migrator already registered for {resource_type} ({source_version} -> {target_version})")]
    Duplicate {
        /// Old resource type
        resource_type: String,
        /// Source version tag
        source_version: String,
        /// Target version tag
        target_version: String,
    },
}
