//! Compound identifier resolution.
//!
//! Pipeline: drug name → public compound database → canonical SMILES

mod cache;
mod pubchem;

pub use cache::*;
pub use pubchem::*;

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::models::normalize_drug_name;

/// Resolver errors.
///
/// These are transient failures. A name the database does not know is
/// `Ok(None)`, not an error.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Compound database returned status {0}")]
    Status(u16),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Translates a free-text drug name into a canonical identifier.
pub trait CompoundResolver: Send + Sync {
    /// Resolve a name, distinguishing "not found" (`Ok(None)`) from failure.
    fn resolve_identifier(&self, name: &str) -> ResolverResult<Option<String>>;

    /// Resolve a name; any failure yields `None`.
    fn resolve(&self, name: &str) -> Option<String> {
        match self.resolve_identifier(name) {
            Ok(id) => id,
            Err(e) => {
                warn!(name, error = %e, "identifier resolution failed");
                None
            }
        }
    }
}

impl<R: CompoundResolver + ?Sized> CompoundResolver for Box<R> {
    fn resolve_identifier(&self, name: &str) -> ResolverResult<Option<String>> {
        (**self).resolve_identifier(name)
    }
}

/// Resolver backed by a fixed name → identifier map.
///
/// Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    identifiers: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping (builder style).
    pub fn with(mut self, name: &str, canonical_id: &str) -> Self {
        self.insert(name, canonical_id);
        self
    }

    /// Add a mapping.
    pub fn insert(&mut self, name: &str, canonical_id: &str) {
        self.identifiers
            .insert(normalize_drug_name(name), canonical_id.to_string());
    }
}

impl CompoundResolver for StaticResolver {
    fn resolve_identifier(&self, name: &str) -> ResolverResult<Option<String>> {
        Ok(self.identifiers.get(&normalize_drug_name(name)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingResolver;

    impl CompoundResolver for FailingResolver {
        fn resolve_identifier(&self, _name: &str) -> ResolverResult<Option<String>> {
            Err(ResolverError::Status(503))
        }
    }

    #[test]
    fn test_static_resolver_case_insensitive() {
        let resolver = StaticResolver::new().with("Aspirin", "CC(=O)OC1=CC=CC=C1C(=O)O");

        assert_eq!(
            resolver.resolve(" ASPIRIN "),
            Some("CC(=O)OC1=CC=CC=C1C(=O)O".to_string())
        );
        assert_eq!(resolver.resolve("NotARealDrugXYZ123"), None);
    }

    #[test]
    fn test_resolve_swallows_errors() {
        let resolver = FailingResolver;
        assert!(resolver.resolve_identifier("aspirin").is_err());
        assert_eq!(resolver.resolve("aspirin"), None);
    }

    #[test]
    fn test_boxed_resolver() {
        let resolver: Box<dyn CompoundResolver> =
            Box::new(StaticResolver::new().with("warfarin", "W"));
        assert_eq!(resolver.resolve("Warfarin"), Some("W".to_string()));
    }
}
