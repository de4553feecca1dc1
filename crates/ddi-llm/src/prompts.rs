//! Prompts for summaries, drug briefs, chat and animation scripts.

use crate::chat::{ChatMessage, Role};

/// System context shared by the summary and brief prompts.
pub const SYSTEM_PROMPT: &str = r#"You are a pharmacology assistant that explains drug-drug interactions to patients.

Rules:
- Use plain language a patient without medical training can follow.
- Do not invent side effects that are not in the provided data.
- Do not give dosing instructions.
- Recommend consulting a doctor or pharmacist when risks are serious."#;

/// Number of facts requested for a drug brief.
pub const BRIEF_LINES: usize = 5;

/// Prompt asking for a plain-language summary of an interaction.
pub fn make_summary_prompt(side_effects: &str) -> String {
    format!(
        r#"{}

Two medications taken together are associated with these side effects:

"{}"

Summarize what this means for a patient in at most four sentences.
Mention the most serious effect first. Return only the summary text."#,
        SYSTEM_PROMPT, side_effects
    )
}

/// Prompt asking for a short factual brief about one drug.
pub fn make_brief_prompt(drug_name: &str) -> String {
    format!(
        r#"You are a research assistant specializing in medical reference material.

Task: Retrieve concise information about the drug {name} from reliable medical sources.

Required information:
- What is {name}?
- What is it used for?
- How does it affect health positively and negatively?
- Common side effects and risks.
- Any notable interactions with other substances.

Provide exactly {lines} bullet points, each containing one relevant fact."#,
        name = drug_name,
        lines = BRIEF_LINES
    )
}

/// Instructions for the conversational assistant.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a medical assistant chatbot. The user will provide two drug names, \
and you should analyze their interaction. Provide a short description of their interaction, \
and state whether it is safe to consume them together. If they are not safe together, suggest \
a safer alternative drug. Keep responses concise.";

/// Prompt carrying the whole conversation, ending on the assistant's turn.
pub fn make_chat_prompt(history: &[ChatMessage]) -> String {
    let mut prompt = format!("{}\n\nConversation so far:\n", CHAT_SYSTEM_PROMPT);
    for message in history {
        prompt.push_str(&format!("\n{}: {}\n", message.role.label(), message.content));
    }
    prompt.push_str(&format!("\n{}:", Role::Assistant.label()));
    prompt
}

/// Inputs for the animation-script prompt.
#[derive(Debug, Clone, Default)]
pub struct AnimationScriptInput<'a> {
    pub drug1_name: &'a str,
    pub drug2_name: &'a str,
    pub drug1_image: &'a str,
    pub drug2_image: &'a str,
    pub drug1_brief: &'a str,
    pub drug2_brief: &'a str,
    pub side_effects: &'a str,
}

/// Name of the scene class the renderer invokes.
pub const SCENE_NAME: &str = "DrugInteraction";

/// Skeleton shown to the model as the expected script shape.
const SCRIPT_EXAMPLE: &str = r#"```python
from manim import *
from manim_voiceover import VoiceoverScene
from manim_voiceover.services.gtts import GTTSService


class DrugInteraction(VoiceoverScene):
    def construct(self):
        self.set_speech_service(GTTSService())

        title = Text("Understanding Drug Interactions:", font_size=48).to_edge(UP, buff=0.5)
        subtitle = Text("Warfarin & Aspirin", font_size=42, color=YELLOW).next_to(title, DOWN)

        with self.voiceover(text="Let's look at how warfarin and aspirin interact.") as tracker:
            self.play(Write(title), FadeIn(subtitle), run_time=tracker.duration)

        warfarin = ImageMobject("warfarin.png").scale(0.8).to_edge(LEFT, buff=1)
        aspirin = ImageMobject("aspirin.png").scale(0.8).to_edge(RIGHT, buff=1)

        with self.voiceover(text="Both drugs affect how your blood clots."):
            self.play(FadeOut(subtitle), FadeIn(warfarin), FadeIn(aspirin))

        warning = Text("Increased bleeding risk", font_size=36, color=RED).to_edge(DOWN)
        with self.voiceover(text="Together they raise the risk of serious bleeding."):
            self.play(Write(warning))

        with self.voiceover(text="Always talk to your doctor before combining these medications."):
            self.play(FadeOut(title), FadeOut(warfarin), FadeOut(aspirin), FadeOut(warning))
```"#;

/// Prompt asking for a runnable animation script.
pub fn make_animation_script_prompt(input: &AnimationScriptInput<'_>) -> String {
    format!(
        r#"You are an expert in creating educational animations using Manim.

Task: Generate a Manim script that visualizes the interaction between {d1} and {d2} in about 30 seconds.

Input data:
- Drug 1: {d1} (image: {i1}) (info: {b1})
- Drug 2: {d2} (image: {i2}) (info: {b2})
- Known side effects: {se}

Animation elements:
1. Title screen with drug names
2. Display the molecule images of both drugs
3. Explain their function using voiceover text
4. Show the drug interaction process
5. Highlight potential risks and side effects
6. Provide medical recommendations and safety information

Voice-over requirement:
- Every explanatory text must be spoken using VoiceoverScene and GTTSService from manim_voiceover.services.gtts.

Requirements:
- The scene class must be named {scene}.
- Use the provided image files for the molecules.
- Use RED for warnings, YELLOW for cautions, BLUE for information.
- Return ONLY a fully runnable Manim Python script.

Example working code:
{example}

Generate the complete Manim script below:"#,
        d1 = input.drug1_name,
        d2 = input.drug2_name,
        i1 = input.drug1_image,
        i2 = input.drug2_image,
        b1 = input.drug1_brief,
        b2 = input.drug2_brief,
        se = input.side_effects,
        scene = SCENE_NAME,
        example = SCRIPT_EXAMPLE,
    )
}
