//! Drug identity models.

use serde::{Deserialize, Serialize};

/// A user-supplied drug name together with its resolved canonical identifier.
///
/// Created per lookup request and never mutated after resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrugIdentity {
    /// Name as typed by the user
    pub name: String,
    /// Canonical SMILES; `None` if resolution failed
    pub canonical_id: Option<String>,
}

impl DrugIdentity {
    /// Create an identity that has not been resolved yet.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canonical_id: None,
        }
    }

    /// Create a resolved identity.
    pub fn resolved(name: impl Into<String>, canonical_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canonical_id: Some(canonical_id.into()),
        }
    }

    /// Name used for case-insensitive comparisons and cache keys.
    pub fn normalized_name(&self) -> String {
        normalize_drug_name(&self.name)
    }

    /// Whether a non-empty canonical identifier is present.
    pub fn is_resolved(&self) -> bool {
        self.canonical_id
            .as_deref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Trim and lowercase a drug name.
pub fn normalize_drug_name(name: &str) -> String {
    name.trim().to_lowercase()
}
