//! Animation script drafting.

use ddi_llm::{
    clean_generated_script, make_animation_script_prompt, AnimationScriptInput, DrugBriefer,
    TextGenerator, SCENE_NAME,
};
use tracing::{debug, info};

use crate::payload::AnimationPayload;
use crate::pipeline::{PipelineError, PipelineResult};

/// Drafts a runnable animation script with a text generator.
pub struct ScriptWriter<G> {
    generator: G,
}

impl<G: TextGenerator> ScriptWriter<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Draft a script for a payload, given the two image file names.
    ///
    /// The script must define the scene class the renderer invokes.
    pub fn write_script(
        &self,
        payload: &AnimationPayload,
        image1: &str,
        image2: &str,
    ) -> PipelineResult<String> {
        let briefer = DrugBriefer::new(&self.generator);
        let brief1 = briefer.brief(&payload.drug1);
        let brief2 = briefer.brief(&payload.drug2);

        let prompt = make_animation_script_prompt(&AnimationScriptInput {
            drug1_name: payload.drug1.trim(),
            drug2_name: payload.drug2.trim(),
            drug1_image: image1,
            drug2_image: image2,
            drug1_brief: &brief1,
            drug2_brief: &brief2,
            side_effects: payload.side_effects.trim(),
        });
        debug!(prompt_len = prompt.len(), "drafting animation script");

        let response = self
            .generator
            .generate(&prompt)
            .map_err(|e| PipelineError::Script(e.to_string()))?;
        let script = clean_generated_script(&response);

        if !script.contains(&format!("class {}", SCENE_NAME)) {
            return Err(PipelineError::Script(format!(
                "generated script does not define {}",
                SCENE_NAME
            )));
        }

        info!(lines = script.lines().count(), "animation script drafted");
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddi_llm::MockGenerator;

    fn payload() -> AnimationPayload {
        AnimationPayload::new("Warfarin", "Aspirin", "C1", "C2", "1: hemorrhage")
    }

    #[test]
    fn test_write_script_uses_briefs() {
        let mock = MockGenerator::new()
            .with_response("- Warfarin is an anticoagulant.")
            .with_response("- Aspirin is an NSAID.")
            .with_response("```python\nclass DrugInteraction(VoiceoverScene):\n    pass\n```");
        let writer = ScriptWriter::new(&mock);

        let script = writer.write_script(&payload(), "drug1.png", "drug2.png").unwrap();
        assert_eq!(script, "class DrugInteraction(VoiceoverScene):\n    pass");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("Warfarin is an anticoagulant."));
        assert!(prompts[2].contains("(image: drug2.png)"));
    }

    #[test]
    fn test_write_script_rejects_missing_scene() {
        let mock = MockGenerator::new()
            .with_response("- a")
            .with_response("- b")
            .with_response("print('hello')");
        let writer = ScriptWriter::new(&mock);

        assert!(matches!(
            writer.write_script(&payload(), "a.png", "b.png"),
            Err(PipelineError::Script(_))
        ));
    }

    #[test]
    fn test_write_script_generator_failure() {
        // Briefs fall back; the script call itself fails on the empty queue.
        let writer = ScriptWriter::new(MockGenerator::new());
        assert!(matches!(
            writer.write_script(&payload(), "a.png", "b.png"),
            Err(PipelineError::Script(_))
        ));
    }
}
