//! Per-document migration context
//!
//! A [`Context`] is created for one document, threaded through every
//! pipeline handler, and dropped when the pipeline finishes. It is never
//! shared between documents.

use crate::config::MigrateConfig;
use crate::diagnostic::{Diagnostic, Diagnostics};
use serde_json::Value;
use std::collections::BTreeMap;
use tfm_hcl::ConfigFile;

/// Counters and facts recorded by handlers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    /// Record value under key, replacing any previous value
    #[inline]
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up unsigned counter
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    /// Iterate in key order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// State of one document moving through the pipeline
#[derive(Debug, Clone)]
pub struct Context {
    /// Document text; replaced by the final handler output
    pub content: String,
    /// Document name for logs and reports
    pub name: Option<String>,
    /// Parsed state document (state path)
    pub state: Option<Value>,
    /// Parsed configuration file (config path)
    pub config: Option<ConfigFile>,
    /// Schema generation the document is written for
    pub source_version: String,
    /// Schema generation to migrate to
    pub target_version: String,
    /// Fallback timestamp for migrators
    pub default_timestamp: String,
    /// Recorded anomalies
    pub diagnostics: Diagnostics,
    /// Handler counters
    pub metadata: Metadata,
}

impl Context {
    /// Create context for document text
    #[must_use]
    pub fn new(content: impl Into<String>, config: &MigrateConfig) -> Self {
        Self {
            content: content.into(),
            name: None,
            state: None,
            config: None,
            source_version: config.source_version.clone(),
            target_version: config.target_version.clone(),
            default_timestamp: config.default_timestamp.clone(),
            diagnostics: Diagnostics::new(),
            metadata: Metadata::default(),
        }
    }

    /// With document name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name for logging, `<input>` when unnamed
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<input>")
    }

    /// Append warning diagnostic
    pub fn warn(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(summary, detail));
    }

    /// Append diagnostic
    #[inline]
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
