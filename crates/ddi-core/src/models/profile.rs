//! Saved medication profile.

use serde::{Deserialize, Serialize};

/// A user's saved medications and allergies.
///
/// Overwritten wholesale by every save; never merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedProfile {
    /// Current medications, in entry order
    pub medications: Vec<String>,
    /// Known allergies, in entry order
    pub allergies: Vec<String>,
    /// RFC 3339 timestamp of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl SavedProfile {
    pub fn new(medications: Vec<String>, allergies: Vec<String>) -> Self {
        Self {
            medications: clean_entries(medications),
            allergies: clean_entries(allergies),
            saved_at: None,
        }
    }

    /// Build a profile from free text, one entry per line.
    pub fn from_text(medications: &str, allergies: &str) -> Self {
        Self::new(
            medications.lines().map(str::to_string).collect(),
            allergies.lines().map(str::to_string).collect(),
        )
    }

    /// Whether the profile has at least one medication.
    pub fn has_medications(&self) -> bool {
        !self.medications.is_empty()
    }

    /// Mark the profile as saved now.
    pub fn stamp(mut self) -> Self {
        self.saved_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}

/// Trim entries and drop blanks.
fn clean_entries(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_lines() {
        let profile = SavedProfile::from_text("Warfarin\n\n  Ibuprofen \n", "penicillin");
        assert_eq!(profile.medications, vec!["Warfarin", "Ibuprofen"]);
        assert_eq!(profile.allergies, vec!["penicillin"]);
        assert!(profile.has_medications());
    }

    #[test]
    fn test_empty_profile() {
        let profile = SavedProfile::from_text("   \n", "");
        assert!(!profile.has_medications());
        assert!(profile.allergies.is_empty());
    }

    #[test]
    fn test_stamp_sets_timestamp() {
        let profile = SavedProfile::default().stamp();
        assert!(profile.saved_at.is_some());
    }
}
