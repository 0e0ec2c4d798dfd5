/// Input beyond this many characters is truncated, never rejected.
pub const MAX_INPUT_CHARS: usize = 8000;

/// The exact sentinel the classifier emits for "no meaningful activity".
pub const NONE_SENTINEL: &str = "NONE";

/// The two classification prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// 0-2 action-verb-led lines summarizing accomplished work, or NONE.
    /// Feeds the daily log.
    DevelopmentCompleted,
    /// Bullet lines tagged [decision]/[done]/[tested]/[open], or NONE.
    /// Feeds the handoff document's auto-captured section.
    SessionContext,
}

impl PromptVariant {
    /// Render the full user-role prompt for an exchange.
    pub fn render(&self, text: &str) -> String {
        let input = truncate_input(text);
        match self {
            PromptVariant::DevelopmentCompleted => format!(
                "Below is an excerpt of an AI coding session. If development work \
                 was completed, summarize it as 0-2 short lines, each starting with \
                 a past-tense action verb (e.g. \"Implemented\", \"Fixed\"). If no \
                 meaningful work was completed, reply with exactly {NONE_SENTINEL}.\n\n\
                 {input}"
            ),
            PromptVariant::SessionContext => format!(
                "Below is an excerpt of an AI coding session. Extract the current \
                 working context as bullet lines, each tagged with one of \
                 [decision], [done], [tested], [open]. Only include items worth \
                 carrying into the next session. If there is no meaningful \
                 activity, reply with exactly {NONE_SENTINEL}.\n\n\
                 {input}"
            ),
        }
    }
}

fn truncate_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((at, _)) => &text[..at],
        None => text,
    }
}
