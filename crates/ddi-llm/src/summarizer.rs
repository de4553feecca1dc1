//! Side-effect summarization.
//!
//! Summarization is best effort: any failure falls back to the raw text so
//! the caller always has something to show.

use tracing::{info, warn};

use crate::client::TextGenerator;
use crate::extraction::clean_side_effects;
use crate::prompts::make_summary_prompt;

/// Outcome of a summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Text produced by the generator.
    Generated(String),
    /// The raw input, returned unchanged, with the reason generation was skipped.
    Fallback { raw: String, reason: String },
}

impl Summary {
    /// Text to display.
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) => text,
            Summary::Fallback { raw, .. } => raw,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Summary::Generated(text) => text,
            Summary::Fallback { raw, .. } => raw,
        }
    }
}

/// Condenses raw side-effect text into a plain-language summary.
pub struct Summarizer<G> {
    generator: G,
}

impl<G: TextGenerator> Summarizer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Summarize, reporting whether the result was generated or a fallback.
    pub fn summarize_outcome(&self, raw: &str) -> Summary {
        let cleaned = clean_side_effects(raw);
        if cleaned.is_empty() {
            return Summary::Fallback {
                raw: raw.to_string(),
                reason: "no side effects to summarize".to_string(),
            };
        }

        match self.generator.generate(&make_summary_prompt(&cleaned)) {
            Ok(text) if !text.trim().is_empty() => {
                info!(input_len = raw.len(), "side effects summarized");
                Summary::Generated(text.trim().to_string())
            }
            Ok(_) => Summary::Fallback {
                raw: raw.to_string(),
                reason: "empty response".to_string(),
            },
            Err(e) => {
                warn!(error = %e, "summarization failed, showing raw side effects");
                Summary::Fallback {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Summarize; never fails and returns `raw` unchanged on any failure.
    pub fn summarize(&self, raw: &str) -> String {
        self.summarize_outcome(raw).into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmError, MockGenerator};
    use proptest::prelude::*;

    #[test]
    fn test_generated_summary() {
        let summarizer = Summarizer::new(
            MockGenerator::new().with_response("  Taking both raises your bleeding risk.  "),
        );

        let summary = summarizer.summarize_outcome("1: hemorrhage; 2: anaemia");
        assert_eq!(
            summary,
            Summary::Generated("Taking both raises your bleeding risk.".into())
        );
        assert!(summary.is_generated());
    }

    #[test]
    fn test_prompt_uses_cleaned_text() {
        let mock = MockGenerator::new().with_response("ok");
        let summarizer = Summarizer::new(&mock);
        summarizer.summarize("1: hemorrhage; 2: anaemia");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("hemorrhage; anaemia"));
        assert!(!prompts[0].contains("1: hemorrhage"));
    }

    #[test]
    fn test_failure_returns_raw_unchanged() {
        let raw = "1: hemorrhage; 2: anaemia";
        let summarizer = Summarizer::new(
            MockGenerator::new().with_error(LlmError::Api { status: 429, body: "quota".into() }),
        );

        let summary = summarizer.summarize_outcome(raw);
        assert!(matches!(&summary, Summary::Fallback { raw: r, .. } if r == raw));
        assert_eq!(summary.text(), raw);
    }

    #[test]
    fn test_empty_input_skips_generator() {
        let mock = MockGenerator::new().with_response("unused");
        let summarizer = Summarizer::new(&mock);

        assert_eq!(summarizer.summarize(" ; "), " ; ");
        assert!(mock.prompts().is_empty());
    }

    #[test]
    fn test_blank_response_falls_back() {
        let summarizer = Summarizer::new(MockGenerator::new().with_response("   "));
        assert!(!summarizer.summarize_outcome("nausea").is_generated());
    }

    proptest! {
        #[test]
        fn prop_failing_generator_returns_input_unchanged(raw in "\\PC{0,120}") {
            let summarizer = Summarizer::new(MockGenerator::new().with_error(LlmError::MissingApiKey));
            prop_assert_eq!(summarizer.summarize(&raw), raw);
        }
    }
}
