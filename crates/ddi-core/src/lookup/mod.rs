//! Interaction lookup service.
//!
//! Pipeline: validate names → resolve both → symmetric store query → result
//!
//! No step retries; the caller decides whether to try again.

use thiserror::Error;
use tracing::{info, warn};

use crate::db::InteractionStore;
use crate::models::{DrugIdentity, InteractionResult, LookupRequest};
use crate::resolver::CompoundResolver;

/// Lookup errors. All of them terminate the current lookup attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not resolve drug: {0}")]
    UnresolvedDrug(String),

    #[error("Identifier lookup failed for {name}: {reason}")]
    ResolutionFailed { name: String, reason: String },

    #[error("Interaction store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Outcome of checking one saved medication against a primary drug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCheck {
    /// The medication as it appears in the de-duplicated profile
    pub medication: String,
    /// Lookup outcome, scoped to this entry
    pub outcome: LookupResult<InteractionResult>,
}

/// Resolves drug names and queries the store for a pairwise interaction.
pub struct InteractionLookup<'a> {
    resolver: &'a dyn CompoundResolver,
    store: &'a dyn InteractionStore,
}

impl<'a> InteractionLookup<'a> {
    /// Create a new lookup service.
    pub fn new(resolver: &'a dyn CompoundResolver, store: &'a dyn InteractionStore) -> Self {
        Self { resolver, store }
    }

    /// Look up the interaction between two drug names, in either order.
    pub fn lookup(&self, name_a: &str, name_b: &str) -> LookupResult<InteractionResult> {
        validate_name(name_a)?;
        validate_name(name_b)?;

        let drug_a = self.resolve_drug(name_a)?;
        let drug_b = self.resolve_drug(name_b)?;

        self.find_interaction(drug_a, drug_b)
    }

    /// Look up a typed request.
    pub fn lookup_request(&self, request: &LookupRequest) -> LookupResult<InteractionResult> {
        self.lookup(&request.name_a, &request.name_b)
    }

    /// Check `primary` against every medication in a saved profile.
    ///
    /// The profile is de-duplicated by trimmed, case-sensitive equality in
    /// first-occurrence order; blank entries are dropped. A failure on one
    /// entry is reported for that entry only. A failure on `primary` fails the
    /// whole batch since no entry could be checked.
    pub fn lookup_against_profile(
        &self,
        primary: &str,
        profile: &[String],
    ) -> LookupResult<Vec<ProfileCheck>> {
        validate_name(primary)?;
        let primary_drug = self.resolve_drug(primary)?;

        let checks = dedup_profile(profile)
            .into_iter()
            .map(|medication| {
                let outcome = self
                    .resolve_drug(&medication)
                    .and_then(|drug| self.find_interaction(primary_drug.clone(), drug));
                if let Err(e) = &outcome {
                    warn!(medication = %medication, error = %e, "profile entry check failed");
                }
                ProfileCheck { medication, outcome }
            })
            .collect();

        Ok(checks)
    }

    /// Resolve a name to an identity with a canonical identifier.
    fn resolve_drug(&self, name: &str) -> LookupResult<DrugIdentity> {
        let name = name.trim();
        match self.resolver.resolve_identifier(name) {
            Ok(Some(id)) if !id.trim().is_empty() => Ok(DrugIdentity::resolved(name, id)),
            Ok(_) => Err(LookupError::UnresolvedDrug(name.to_string())),
            Err(e) => Err(LookupError::ResolutionFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Query the store for two resolved identities.
    fn find_interaction(
        &self,
        drug_a: DrugIdentity,
        drug_b: DrugIdentity,
    ) -> LookupResult<InteractionResult> {
        let (id_a, id_b) = match (&drug_a.canonical_id, &drug_b.canonical_id) {
            (Some(a), Some(b)) => (a.as_str(), b.as_str()),
            (None, _) => return Err(LookupError::UnresolvedDrug(drug_a.name)),
            (_, None) => return Err(LookupError::UnresolvedDrug(drug_b.name)),
        };

        let record = self
            .store
            .find_pair(id_a, id_b)
            .map_err(|e| LookupError::StoreUnavailable(e.to_string()))?;

        let result = match record {
            Some(record) => InteractionResult::found(drug_a, drug_b, record.side_effects),
            None => InteractionResult::not_found(drug_a, drug_b),
        };

        info!(
            drug_a = %result.drug_a.name,
            drug_b = %result.drug_b.name,
            found = result.found,
            "interaction lookup"
        );
        Ok(result)
    }
}

/// Reject names that are empty after trimming.
fn validate_name(name: &str) -> LookupResult<()> {
    if name.trim().is_empty() {
        return Err(LookupError::InvalidInput(
            "drug name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Trim, drop blanks, and remove exact duplicates keeping first occurrence.
pub fn dedup_profile(profile: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    profile
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .filter(|entry| seen.insert(entry.to_string()))
        .map(str::to_string)
        .collect()
}
