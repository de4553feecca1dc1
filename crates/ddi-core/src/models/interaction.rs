//! Interaction records and lookup results.

use serde::{Deserialize, Serialize};

use super::DrugIdentity;

/// A stored fact that two canonical identifiers have a documented combined
/// side-effect profile.
///
/// The pair is unordered: `(id1, id2)` is equivalent to `(id2, id1)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionRecord {
    /// Row id assigned by the store (0 before insertion)
    pub id: i64,
    /// First canonical identifier
    pub id1: String,
    /// Second canonical identifier
    pub id2: String,
    /// Semi-structured side effects, e.g. "1: nausea; 2: headache"
    pub side_effects: String,
}

impl InteractionRecord {
    /// Create a record that has not been stored yet.
    pub fn new(id1: impl Into<String>, id2: impl Into<String>, side_effects: impl Into<String>) -> Self {
        Self {
            id: 0,
            id1: id1.into(),
            id2: id2.into(),
            side_effects: side_effects.into(),
        }
    }

    /// Check whether this record describes the pair `{a, b}` in either order.
    pub fn matches_pair(&self, a: &str, b: &str) -> bool {
        (self.id1 == a && self.id2 == b) || (self.id1 == b && self.id2 == a)
    }

    /// Split the side-effect text into its `index: description` entries.
    ///
    /// Entries without an index marker are returned with index `None`.
    pub fn side_effect_entries(&self) -> Vec<SideEffectEntry> {
        parse_side_effect_entries(&self.side_effects)
    }
}

/// One entry of a side-effect list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideEffectEntry {
    /// Numeric index from the dataset, if present
    pub index: Option<u32>,
    /// Side-effect description
    pub description: String,
}

/// Parse `"1: nausea; 2: headache"` style text into entries.
pub fn parse_side_effect_entries(text: &str) -> Vec<SideEffectEntry> {
    text.split(|c: char| c == ';' || c == '\n' || c == '|')
        .flat_map(split_indexed_commas)
        .filter_map(|segment| {
            let segment = segment.trim().trim_end_matches(|c: char| c == ',' || c.is_whitespace());
            if segment.is_empty() {
                return None;
            }
            match segment.split_once(':') {
                Some((index, description)) if index.trim().parse::<u32>().is_ok() => {
                    let description = description.trim();
                    if description.is_empty() {
                        return None;
                    }
                    Some(SideEffectEntry {
                        index: index.trim().parse().ok(),
                        description: description.to_string(),
                    })
                }
                _ => Some(SideEffectEntry {
                    index: None,
                    description: segment.to_string(),
                }),
            }
        })
        .collect()
}

/// Split on commas only where the next piece starts with an index marker,
/// so descriptions containing commas stay intact.
fn split_indexed_commas(segment: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, _) in segment.match_indices(',') {
        let rest = segment[pos + 1..].trim_start();
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() && rest[digits.len()..].trim_start().starts_with(':') {
            pieces.push(&segment[start..pos]);
            start = pos + 1;
        }
    }
    pieces.push(&segment[start..]);
    pieces
}

/// Typed request for a pairwise lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupRequest {
    pub name_a: String,
    pub name_b: String,
}

impl LookupRequest {
    pub fn new(name_a: impl Into<String>, name_b: impl Into<String>) -> Self {
        Self {
            name_a: name_a.into(),
            name_b: name_b.into(),
        }
    }
}

/// Result of a pairwise interaction lookup. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionResult {
    /// First drug as requested and resolved
    pub drug_a: DrugIdentity,
    /// Second drug as requested and resolved
    pub drug_b: DrugIdentity,
    /// Whether a stored interaction exists for the pair
    pub found: bool,
    /// Raw side-effect text (present only if found)
    pub side_effects_raw: Option<String>,
    /// Natural-language summary of the side effects
    pub summary: Option<String>,
}

impl InteractionResult {
    /// Result for a pair with a stored interaction.
    pub fn found(drug_a: DrugIdentity, drug_b: DrugIdentity, side_effects: String) -> Self {
        Self {
            drug_a,
            drug_b,
            found: true,
            side_effects_raw: Some(side_effects),
            summary: None,
        }
    }

    /// Result for a pair without a stored interaction.
    pub fn not_found(drug_a: DrugIdentity, drug_b: DrugIdentity) -> Self {
        Self {
            drug_a,
            drug_b,
            found: false,
            side_effects_raw: None,
            summary: None,
        }
    }

    /// Attach a summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Text to display: the summary if present, else the raw side effects.
    pub fn display_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .or(self.side_effects_raw.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_pair_either_order() {
        let record = InteractionRecord::new("X", "Y", "1: nausea");
        assert!(record.matches_pair("X", "Y"));
        assert!(record.matches_pair("Y", "X"));
        assert!(!record.matches_pair("X", "Z"));
    }

    #[test]
    fn test_side_effect_entries() {
        let record = InteractionRecord::new("X", "Y", "1: nausea; 2: headache");
        let entries = record.side_effect_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, Some(1));
        assert_eq!(entries[0].description, "nausea");
        assert_eq!(entries[1].description, "headache");
    }

    #[test]
    fn test_side_effect_entries_comma_separated() {
        let entries = parse_side_effect_entries("0: hypotension, 1: nausea, vomiting, 2: rash,");
        let descriptions: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["hypotension", "nausea, vomiting", "rash"]);
    }

    #[test]
    fn test_side_effect_entries_without_index() {
        let entries = parse_side_effect_entries("bleeding risk");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, None);
        assert_eq!(entries[0].description, "bleeding risk");
    }

    #[test]
    fn test_display_text_prefers_summary() {
        let a = DrugIdentity::resolved("a", "X");
        let b = DrugIdentity::resolved("b", "Y");
        let result = InteractionResult::found(a.clone(), b.clone(), "1: nausea".into());
        assert_eq!(result.display_text(), Some("1: nausea"));

        let result = result.with_summary("May cause nausea.");
        assert_eq!(result.display_text(), Some("May cause nausea."));

        assert_eq!(InteractionResult::not_found(a, b).display_text(), None);
    }
}
