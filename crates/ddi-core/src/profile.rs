//! Saved profile persistence.
//!
//! A profile is overwritten wholesale on every save and never merged.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::models::SavedProfile;

/// Profile persistence errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid profile: {0}")]
    Invalid(String),

    #[error("Profile store lock poisoned")]
    Poisoned,
}

pub type ProfileResult<T> = Result<T, ProfileError>;

/// Storage for a single saved profile.
pub trait ProfileStore {
    /// Load the saved profile, if any.
    fn load(&self) -> ProfileResult<Option<SavedProfile>>;

    /// Replace the saved profile.
    fn save(&self, profile: &SavedProfile) -> ProfileResult<()>;
}

/// Validate and stamp a profile before saving.
///
/// At least one medication is required.
pub fn prepare_for_save(profile: SavedProfile) -> ProfileResult<SavedProfile> {
    if !profile.has_medications() {
        return Err(ProfileError::Invalid(
            "at least one medication is required".to_string(),
        ));
    }
    Ok(profile.stamp())
}

/// Profile stored as a small JSON file.
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> ProfileResult<Option<SavedProfile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, profile: &SavedProfile) -> ProfileResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write a sibling file then rename so readers never see a partial profile
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(profile)?)?;
        fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            medications = profile.medications.len(),
            "profile saved"
        );
        Ok(())
    }
}

/// Session-scoped profile kept in memory.
#[derive(Default)]
pub struct SessionProfileStore {
    profile: Mutex<Option<SavedProfile>>,
}

impl SessionProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for SessionProfileStore {
    fn load(&self) -> ProfileResult<Option<SavedProfile>> {
        let profile = self.profile.lock().map_err(|_| ProfileError::Poisoned)?;
        Ok(profile.clone())
    }

    fn save(&self, profile: &SavedProfile) -> ProfileResult<()> {
        let mut slot = self.profile.lock().map_err(|_| ProfileError::Poisoned)?;
        *slot = Some(profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_requires_medication() {
        let result = prepare_for_save(SavedProfile::from_text("", "penicillin"));
        assert!(matches!(result, Err(ProfileError::Invalid(_))));

        let profile = prepare_for_save(SavedProfile::from_text("Warfarin", "")).unwrap();
        assert!(profile.saved_at.is_some());
    }

    #[test]
    fn test_file_store_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("nested").join("profile.json"));

        assert!(store.load().unwrap().is_none());

        let first = SavedProfile::from_text("Warfarin\nIbuprofen", "penicillin");
        store.save(&first).unwrap();
        assert_eq!(store.load().unwrap(), Some(first));

        let second = SavedProfile::from_text("Metformin", "");
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.medications, vec!["Metformin"]);
        assert!(loaded.allergies.is_empty());
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileProfileStore::new(&path);
        assert!(matches!(store.load(), Err(ProfileError::Json(_))));
    }

    #[test]
    fn test_session_store_isolated() {
        let a = SessionProfileStore::new();
        let b = SessionProfileStore::new();

        a.save(&SavedProfile::from_text("Warfarin", "")).unwrap();

        assert!(a.load().unwrap().is_some());
        assert!(b.load().unwrap().is_none());
    }
}
