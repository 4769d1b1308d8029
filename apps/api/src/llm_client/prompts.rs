// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Output-format constraint appended to every prompt that expects JSON back.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with JSON only. \
    Do NOT wrap the JSON in markdown code fences (no ```json). \
    Do NOT include any explanation, introduction or text outside the JSON.";

/// Instruction sent alongside inline audio for one-shot transcription.
pub const TRANSCRIPTION_INSTRUCTION: &str = "Transcribe the following audio:";

/// Fills `{name}` placeholders in a single pass. Substituted values are never re-scanned,
/// so user text containing `{question}` or similar stays literal.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = values.iter().find(|(name, _)| {
            tail.len() > name.len() + 1
                && tail[1..].starts_with(name)
                && tail[1 + name.len()..].starts_with('}')
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out
}
