//! Text cleanup for model input and output.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Leading `index:` markers, as in `0: hemorrhage`.
    static ref INDEX_MARKER: Regex = Regex::new(r"^(\s*\d+\s*:\s*)+").unwrap();
    /// A comma that introduces the next indexed entry.
    static ref INDEXED_COMMA: Regex = Regex::new(r",\s*(\d+\s*:)").unwrap();
    /// A fenced code block, optionally tagged as Python.
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").unwrap();
}

/// Normalize semi-structured side-effect text for prompting.
///
/// Index markers are removed from each entry and entries are joined with
/// `"; "`. Empty entries and trailing separators are dropped.
pub fn clean_side_effects(raw: &str) -> String {
    let separated = INDEXED_COMMA.replace_all(raw, ";$1");
    separated
        .split(|c: char| c == ';' || c == '\n' || c == '|')
        .map(|segment| INDEX_MARKER.replace(segment, ""))
        .map(|segment| segment.trim().trim_end_matches([',', '.']).trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extract the script body from a model response.
///
/// The content of the first fenced block is returned when one exists;
/// otherwise stray fence markers are stripped from the ends.
pub fn clean_generated_script(response: &str) -> String {
    if let Some(captures) = CODE_FENCE.captures(response) {
        if let Some(body) = captures.get(1) {
            return body.as_str().trim().to_string();
        }
    }

    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("python")
            .or_else(|| rest.strip_prefix("py"))
            .unwrap_or(rest);
    }
    text.trim_end_matches('`').trim().to_string()
}

/// Keep at most `max` non-blank lines of a response.
pub fn take_lines(text: &str, max: usize) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .take(max)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_side_effects_semicolons() {
        assert_eq!(
            clean_side_effects("1: nausea; 2: headache; "),
            "nausea; headache"
        );
    }

    #[test]
    fn test_clean_side_effects_indexed_commas() {
        assert_eq!(
            clean_side_effects("1: hemorrhage, with bruising, 2: anaemia"),
            "hemorrhage, with bruising; anaemia"
        );
    }

    #[test]
    fn test_clean_side_effects_unindexed() {
        assert_eq!(clean_side_effects("nausea\nvomiting|rash."), "nausea; vomiting; rash");
        assert_eq!(clean_side_effects(" ; \n "), "");
    }

    #[test]
    fn test_clean_side_effects_keeps_dosage_numbers() {
        assert_eq!(
            clean_side_effects("2.5 mg overdose; 3) rash; 0: 1: fatigue"),
            "2.5 mg overdose; 3) rash; fatigue"
        );
    }

    fn entry_marker() -> Regex {
        Regex::new(r"^\s*\d+\s*:").unwrap()
    }

    proptest! {
        #[test]
        fn prop_cleaned_entries_have_no_index_marker(raw in ".{0,80}") {
            let cleaned = clean_side_effects(&raw);
            for entry in cleaned.split("; ") {
                prop_assert!(!entry_marker().is_match(entry), "entry {:?} from {:?}", entry, raw);
            }
        }

        #[test]
        fn prop_indexed_entries_keep_descriptions(
            entries in prop::collection::vec(("[0-9]{1,2}", "[a-z][a-z ]{0,10}[a-z]"), 1..6)
        ) {
            let raw = entries
                .iter()
                .map(|(index, text)| format!("{}: {}", index, text))
                .collect::<Vec<_>>()
                .join(", ");
            let expected = entries
                .iter()
                .map(|(_, text)| text.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            prop_assert_eq!(clean_side_effects(&raw), expected);
        }
    }

    #[test]
    fn test_clean_generated_script_fenced() {
        let response = "Here is the script:\n```python\nfrom manim import *\n\nclass DrugInteraction(VoiceoverScene):\n    pass\n```\nEnjoy!";
        let script = clean_generated_script(response);
        assert!(script.starts_with("from manim import *"));
        assert!(script.ends_with("pass"));
    }

    #[test]
    fn test_clean_generated_script_unfenced() {
        assert_eq!(clean_generated_script("  from manim import *  "), "from manim import *");
        assert_eq!(clean_generated_script("```python\nprint(1)"), "print(1)");
    }

    #[test]
    fn test_take_lines() {
        let text = "- one\n\n- two\n- three\n- four\n- five\n- six";
        assert_eq!(take_lines(text, 5), "- one\n- two\n- three\n- four\n- five");
        assert_eq!(take_lines("", 5), "");
    }
}
