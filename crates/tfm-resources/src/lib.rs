//! Resource migrators
//!
//! One module per resource family. Each exposes a migrator type and is
//! registered under its old resource type by [`register_all`].
//!
//! # Example
//!
//! ```rust
//! let registry = tfm_resources::default_registry().unwrap();
//! assert!(registry.lookup("cloudflare_record", "v4", "v5").is_some());
//! assert_eq!(
//!     registry.renames("v4", "v5"),
//!     vec![
//!         ("cloudflare_record".to_string(), "cloudflare_dns_record".to_string()),
//!         ("cloudflare_teams_rule".to_string(), "cloudflare_zero_trust_gateway_policy".to_string()),
//!     ]
//! );
//! ```

#![warn(unreachable_pub)]

pub mod dns_record;
pub mod zero_trust_gateway_policy;

use std::sync::Arc;
use tfm_core::{MigratorRegistry, RegistryError, ResourceMigrator};

/// Register every built-in migrator
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if `registry` already holds one of the keys.
pub fn register_all(registry: &mut MigratorRegistry) -> Result<(), RegistryError> {
    let migrators: [(&str, &str, Arc<dyn ResourceMigrator>); 2] = [
        ("v4", "v5", Arc::new(dns_record::V4ToV5Migrator)),
        ("v4", "v5", Arc::new(zero_trust_gateway_policy::V4ToV5Migrator)),
    ];
    for (source, target, migrator) in migrators {
        let old = migrator.resource_rename().0.to_string();
        registry.register(&old, source, target, migrator)?;
    }
    Ok(())
}

/// Registry with every built-in migrator
///
/// # Errors
///
/// Returns [`RegistryError`] if two built-in migrators claim the same key.
pub fn default_registry() -> Result<MigratorRegistry, RegistryError> {
    let mut registry = MigratorRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_both_migrators() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry
            .lookup("cloudflare_teams_rule", "v4", "v5")
            .is_some());
    }

    #[test]
    fn second_registration_is_rejected() {
        let mut registry = default_registry().unwrap();
        assert!(register_all(&mut registry).is_err());
        assert_eq!(registry.len(), 2);
    }
}
