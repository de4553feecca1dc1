//! Short factual briefs about a single drug.

use tracing::warn;

use crate::client::TextGenerator;
use crate::extraction::take_lines;
use crate::prompts::{make_brief_prompt, BRIEF_LINES};

/// Fetches short drug briefs from a text generator.
pub struct DrugBriefer<G> {
    generator: G,
}

impl<G: TextGenerator> DrugBriefer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Brief for `name`: at most five lines, or a fixed fallback sentence.
    pub fn brief(&self, name: &str) -> String {
        let name = name.trim();
        let brief = match self.generator.generate(&make_brief_prompt(name)) {
            Ok(text) => take_lines(&text, BRIEF_LINES),
            Err(e) => {
                warn!(drug = name, error = %e, "drug brief unavailable");
                String::new()
            }
        };

        if brief.is_empty() {
            no_information(name)
        } else {
            brief
        }
    }
}

/// Text used when no brief could be produced.
pub fn no_information(name: &str) -> String {
    format!("No reliable information found for {}.", name)
}
