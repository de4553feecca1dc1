//! Plain-text result panels.

use ddi_core::{InteractionResult, LookupResult, ProfileCheck, SavedProfile};
use ddi_video::{AnimationOutcome, AnimationResult};

/// Panel for a single pairwise lookup.
pub fn interaction_panel(result: &InteractionResult) -> String {
    let mut out = format!("{} + {}\n", result.drug_a.name, result.drug_b.name);
    if result.found {
        out.push_str("  Interaction found\n");
        if let Some(text) = result.display_text() {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                out.push_str("  ");
                out.push_str(line.trim());
                out.push('\n');
            }
        }
    } else {
        out.push_str("  No interaction found\n");
    }
    out
}

/// Line describing an animation request outcome.
pub fn animation_line(outcome: &AnimationResult<AnimationOutcome>) -> String {
    match outcome {
        Ok(AnimationOutcome::Ready(url)) => format!("Animation ready: {}", url),
        Ok(AnimationOutcome::Pending { job_id: Some(id) }) => {
            format!("Animation is being generated (job {})", id)
        }
        Ok(AnimationOutcome::Pending { job_id: None }) => {
            "Animation is being generated".to_string()
        }
        Err(e) => format!("Animation unavailable: {}", e),
    }
}

/// Panel for a profile batch check.
pub fn profile_checks(primary: &str, checks: &[ProfileCheck]) -> String {
    if checks.is_empty() {
        return format!("No saved medications to check against {}\n", primary);
    }
    let mut out = format!("{} against saved medications\n", primary);
    for check in checks {
        out.push_str(&profile_line(&check.medication, &check.outcome));
        out.push('\n');
    }
    out
}

fn profile_line(medication: &str, outcome: &LookupResult<InteractionResult>) -> String {
    match outcome {
        Ok(result) if result.found => format!(
            "  {}: interaction found: {}",
            medication,
            result.display_text().unwrap_or("")
        ),
        Ok(_) => format!("  {}: no interaction found", medication),
        Err(e) => format!("  {}: {}", medication, e),
    }
}

/// Panel for a saved profile.
pub fn profile_panel(profile: &SavedProfile) -> String {
    let list = |items: &[String]| {
        if items.is_empty() {
            "  (none)\n".to_string()
        } else {
            items.iter().map(|i| format!("  - {}\n", i)).collect()
        }
    };
    let mut out = String::from("Medications\n");
    out.push_str(&list(profile.medications.as_slice()));
    out.push_str("Allergies\n");
    out.push_str(&list(profile.allergies.as_slice()));
    if let Some(saved_at) = &profile.saved_at {
        out.push_str(&format!("Saved {}\n", saved_at));
    }
    out
}
