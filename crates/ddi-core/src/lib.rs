//! DDI Core Library
//!
//! Drug-drug interaction lookup: free-text drug names are resolved to
//! canonical identifiers and checked against a local interaction store.
//!
//! # Architecture
//!
//! ```text
//!   drug A name ──┐                         ┌── drug B name
//!                 ▼                         ▼
//!          ┌─────────────────────────────────────────┐
//!          │   CompoundResolver (PubChem + cache)    │
//!          │   name → canonical SMILES               │
//!          └────────────────────┬────────────────────┘
//!                               │ (id_a, id_b)
//!                               ▼
//!          ┌─────────────────────────────────────────┐
//!          │   InteractionStore (SQLite)             │
//!          │   (id_a, id_b) OR (id_b, id_a)          │
//!          └────────────────────┬────────────────────┘
//!                               │
//!                               ▼
//!                      InteractionResult
//!                               │
//!               ┌───────────────┼────────────────┐
//!               ▼               ▼                ▼
//!          Summarizer      Profile batch     Animation
//!          (ddi-llm)                        (ddi-video)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite interaction store and dataset import
//! - [`models`]: Domain types (DrugIdentity, InteractionRecord, SavedProfile, etc.)
//! - [`resolver`]: Name → canonical identifier resolution
//! - [`lookup`]: Pairwise and profile-batch interaction lookup
//! - [`profile`]: Saved profile persistence
//! - [`config`]: Environment-driven configuration

pub mod config;
pub mod db;
pub mod lookup;
pub mod models;
pub mod profile;
pub mod resolver;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use db::{Database, ImportOutcome, InteractionStore};
pub use lookup::{InteractionLookup, LookupError, LookupResult, ProfileCheck};
pub use models::{
    DrugIdentity, InteractionRecord, InteractionResult, LookupRequest, SavedProfile,
    SideEffectEntry,
};
pub use profile::{FileProfileStore, ProfileStore, SessionProfileStore};
pub use resolver::{CachingResolver, CompoundResolver, PubChemResolver, StaticResolver};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DdiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not resolve drug: {0}")]
    UnresolvedDrug(String),

    #[error("Identifier lookup failed: {0}")]
    ResolutionFailed(String),

    #[error("Interaction store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("Profile error: {0}")]
    ProfileError(String),
}

impl From<LookupError> for DdiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::InvalidInput(msg) => DdiError::InvalidInput(msg),
            LookupError::UnresolvedDrug(name) => DdiError::UnresolvedDrug(name),
            LookupError::ResolutionFailed { name, reason } => {
                DdiError::ResolutionFailed(format!("{}: {}", name, reason))
            }
            LookupError::StoreUnavailable(msg) => DdiError::StoreUnavailable(msg),
        }
    }
}

impl From<db::DbError> for DdiError {
    fn from(e: db::DbError) -> Self {
        DdiError::DatabaseError(e.to_string())
    }
}

impl From<db::DatasetError> for DdiError {
    fn from(e: db::DatasetError) -> Self {
        DdiError::DatasetError(e.to_string())
    }
}

impl From<resolver::ResolverError> for DdiError {
    fn from(e: resolver::ResolverError) -> Self {
        DdiError::ResolutionFailed(e.to_string())
    }
}

impl From<profile::ProfileError> for DdiError {
    fn from(e: profile::ProfileError) -> Self {
        match e {
            profile::ProfileError::Invalid(msg) => DdiError::InvalidInput(msg),
            other => DdiError::ProfileError(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for DdiError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DdiError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create an interaction store and resolve names through PubChem.
#[uniffi::export]
pub fn open_checker(
    database_path: String,
    pubchem_base_url: String,
    timeout_secs: u64,
) -> Result<Arc<InteractionChecker>, DdiError> {
    let db = Database::open(&database_path)?;
    let resolver = PubChemResolver::new(&pubchem_base_url, Duration::from_secs(timeout_secs))?;
    Ok(Arc::new(InteractionChecker::new(
        db,
        Box::new(CachingResolver::new(resolver)),
    )))
}

/// Create an in-memory checker with a fixed name → identifier table (for testing).
#[uniffi::export]
pub fn open_checker_in_memory(
    identifiers: HashMap<String, String>,
) -> Result<Arc<InteractionChecker>, DdiError> {
    let db = Database::open_in_memory()?;
    let mut resolver = StaticResolver::new();
    for (name, id) in &identifiers {
        resolver.insert(name, id);
    }
    Ok(Arc::new(InteractionChecker::new(db, Box::new(resolver))))
}

/// Save a profile to a JSON file, replacing any previous one.
///
/// Medications and allergies are newline-separated.
#[uniffi::export]
pub fn save_profile(
    path: String,
    medications: String,
    allergies: String,
) -> Result<FfiSavedProfile, DdiError> {
    let profile = profile::prepare_for_save(SavedProfile::from_text(&medications, &allergies))?;
    FileProfileStore::new(&path).save(&profile)?;
    Ok(profile.into())
}

/// Load a profile from a JSON file.
#[uniffi::export]
pub fn load_profile(path: String) -> Result<Option<FfiSavedProfile>, DdiError> {
    let profile = FileProfileStore::new(&path).load()?;
    Ok(profile.map(|p| p.into()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe interaction checker for FFI.
#[derive(uniffi::Object)]
pub struct InteractionChecker {
    db: Mutex<Database>,
    resolver: Box<dyn CompoundResolver>,
}

impl InteractionChecker {
    pub fn new(db: Database, resolver: Box<dyn CompoundResolver>) -> Self {
        Self {
            db: Mutex::new(db),
            resolver,
        }
    }
}

#[uniffi::export]
impl InteractionChecker {
    // =========================================================================
    // Lookup Operations
    // =========================================================================

    /// Look up the interaction between two drugs, in either order.
    pub fn check_interaction(
        &self,
        drug_a: String,
        drug_b: String,
    ) -> Result<FfiInteractionResult, DdiError> {
        let db = self.db.lock()?;
        let lookup = InteractionLookup::new(self.resolver.as_ref(), &*db);
        Ok(lookup.lookup(&drug_a, &drug_b)?.into())
    }

    /// Check one drug against every medication of a profile.
    pub fn check_against_profile(
        &self,
        primary: String,
        medications: Vec<String>,
    ) -> Result<Vec<FfiProfileCheck>, DdiError> {
        let db = self.db.lock()?;
        let lookup = InteractionLookup::new(self.resolver.as_ref(), &*db);
        let checks = lookup.lookup_against_profile(&primary, &medications)?;
        Ok(checks.into_iter().map(|c| c.into()).collect())
    }

    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Number of stored interaction records.
    pub fn interaction_count(&self) -> Result<u64, DdiError> {
        let db = self.db.lock()?;
        Ok(db.count_interactions()?)
    }

    /// Import the dataset if the store is empty.
    pub fn import_dataset(&self, path: String) -> Result<FfiImportOutcome, DdiError> {
        let mut db = self.db.lock()?;
        Ok(db.populate_if_empty(&path)?.into())
    }

    /// Insert a single interaction record.
    pub fn add_interaction(
        &self,
        id1: String,
        id2: String,
        side_effects: String,
    ) -> Result<i64, DdiError> {
        let db = self.db.lock()?;
        Ok(db.insert_interaction(&InteractionRecord::new(id1, id2, side_effects))?)
    }
}

// =========================================================================
// FFI Record Types
// =========================================================================

/// Interaction lookup result for FFI.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteractionResult {
    pub drug_a: String,
    pub drug_b: String,
    pub canonical_id_a: Option<String>,
    pub canonical_id_b: Option<String>,
    pub found: bool,
    pub side_effects: Option<String>,
    pub summary: Option<String>,
}

impl From<InteractionResult> for FfiInteractionResult {
    fn from(r: InteractionResult) -> Self {
        Self {
            drug_a: r.drug_a.name,
            drug_b: r.drug_b.name,
            canonical_id_a: r.drug_a.canonical_id,
            canonical_id_b: r.drug_b.canonical_id,
            found: r.found,
            side_effects: r.side_effects_raw,
            summary: r.summary,
        }
    }
}

/// One profile entry's outcome for FFI.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProfileCheck {
    pub medication: String,
    pub result: Option<FfiInteractionResult>,
    pub error: Option<String>,
}

impl From<ProfileCheck> for FfiProfileCheck {
    fn from(c: ProfileCheck) -> Self {
        match c.outcome {
            Ok(result) => Self {
                medication: c.medication,
                result: Some(result.into()),
                error: None,
            },
            Err(e) => Self {
                medication: c.medication,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Dataset import outcome for FFI.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportOutcome {
    pub already_populated: bool,
    pub existing: u64,
    pub inserted: u64,
    pub skipped: u64,
}

impl From<ImportOutcome> for FfiImportOutcome {
    fn from(o: ImportOutcome) -> Self {
        match o {
            ImportOutcome::AlreadyPopulated { existing } => Self {
                already_populated: true,
                existing,
                inserted: 0,
                skipped: 0,
            },
            ImportOutcome::Imported { inserted, skipped } => Self {
                already_populated: false,
                existing: 0,
                inserted: inserted as u64,
                skipped: skipped as u64,
            },
        }
    }
}

/// Saved profile for FFI.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSavedProfile {
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub saved_at: Option<String>,
}

impl From<SavedProfile> for FfiSavedProfile {
    fn from(p: SavedProfile) -> Self {
        Self {
            medications: p.medications,
            allergies: p.allergies,
            saved_at: p.saved_at,
        }
    }
}
