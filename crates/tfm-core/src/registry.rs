//! Migrator registry
//!
//! Maps (old resource type, source version, target version) to the migrator
//! responsible for it. Built once at startup, then shared read-only as
//! `Arc<MigratorRegistry>` across every document processed in parallel.

use crate::error::RegistryError;
use crate::migrator::ResourceMigrator;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registration key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryKey {
    /// Resource type as written in the source generation
    pub resource_type: String,
    /// Source version tag
    pub source_version: String,
    /// Target version tag
    pub target_version: String,
}

impl RegistryKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(resource_type: &str, source_version: &str, target_version: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            source_version: source_version.to_string(),
            target_version: target_version.to_string(),
        }
    }

    fn matches_versions(&self, source_version: &str, target_version: &str) -> bool {
        self.source_version == source_version && self.target_version == target_version
    }
}

/// Registry of resource migrators
///
/// Duplicate registrations are rejected and the first migrator stays in place.
#[derive(Default, Clone)]
pub struct MigratorRegistry {
    migrators: BTreeMap<RegistryKey, Arc<dyn ResourceMigrator>>,
}

impl MigratorRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register migrator for an old resource type and version pair
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the key is already taken.
    pub fn register(
        &mut self,
        resource_type: &str,
        source_version: &str,
        target_version: &str,
        migrator: Arc<dyn ResourceMigrator>,
    ) -> Result<(), RegistryError> {
        let key = RegistryKey::new(resource_type, source_version, target_version);
        if self.migrators.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                resource_type: key.resource_type,
                source_version: key.source_version,
                target_version: key.target_version,
            });
        }
        tracing::debug!(
            resource_type,
            source_version,
            target_version,
            "registered migrator"
        );
        self.migrators.insert(key, migrator);
        Ok(())
    }

    /// Find migrator; `None` means no migration is defined
    #[must_use]
    pub fn lookup(
        &self,
        resource_type: &str,
        source_version: &str,
        target_version: &str,
    ) -> Option<&Arc<dyn ResourceMigrator>> {
        self.migrators
            .get(&RegistryKey::new(resource_type, source_version, target_version))
    }

    /// Migrators for one version pair, in key order
    pub fn migrators_for<'a>(
        &'a self,
        source_version: &'a str,
        target_version: &'a str,
    ) -> impl Iterator<Item = (&'a RegistryKey, &'a Arc<dyn ResourceMigrator>)> + 'a {
        self.migrators
            .iter()
            .filter(move |(key, _)| key.matches_versions(source_version, target_version))
    }

    /// `(old, new)` type names for one version pair, skipping identity renames
    #[must_use]
    pub fn renames(&self, source_version: &str, target_version: &str) -> Vec<(String, String)> {
        self.migrators_for(source_version, target_version)
            .map(|(_, m)| m.resource_rename())
            .filter(|(old, new)| !new.is_empty() && old != new)
            .map(|(old, new)| (old.to_string(), new.to_string()))
            .collect()
    }

    /// All registration keys in order
    pub fn keys(&self) -> impl Iterator<Item = &RegistryKey> {
        self.migrators.keys()
    }

    /// Get number of registered migrators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.migrators.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.migrators.is_empty()
    }
}

impl std::fmt::Debug for MigratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigratorRegistry")
            .field("keys", &self.migrators.keys().collect::<Vec<_>>())
            .finish()
    }
}
