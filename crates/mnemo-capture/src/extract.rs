use std::path::Path;

use mnemo_core::model::{ContentBlock, MessageContent, Role, TranscriptRecord};

use crate::error::CaptureError;
use crate::transcript::{non_blank_lines, parse_record};

/// Cap on the rendered `USER:` line.
const USER_TEXT_CAP: usize = 200;
/// Cap on the tool-input projection inside a bracketed descriptor.
const TOOL_ARG_CAP: usize = 80;

/// Everything new in a transcript since the last consumed offset.
/// Transient; exists only within one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedExchange {
    pub text: String,
    pub has_state_change: bool,
    pub new_offset: u64,
}

impl NormalizedExchange {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extract the normalized exchange from raw transcript content, starting
/// at `offset` (an index into the non-blank line sequence).
pub fn extract_exchange(content: &str, offset: u64) -> NormalizedExchange {
    let lines = non_blank_lines(content);
    let new_offset = lines.len() as u64;

    let mut text_lines: Vec<String> = Vec::new();
    let mut has_state_change = false;

    for line in lines.iter().skip(offset as usize) {
        let Some(record) = parse_record(line) else {
            continue;
        };
        render_record(&record, &mut text_lines, &mut has_state_change);
    }

    NormalizedExchange {
        text: text_lines.join("\n"),
        has_state_change,
        new_offset,
    }
}

/// Extract from a transcript file on disk.
pub fn extract_from_file(path: &Path, offset: u64) -> Result<NormalizedExchange, CaptureError> {
    let content = std::fs::read_to_string(path)?;
    Ok(extract_exchange(&content, offset))
}

fn render_record(record: &TranscriptRecord, out: &mut Vec<String>, has_state_change: &mut bool) {
    match record.role {
        Role::User => match &record.content {
            MessageContent::Text(text) => push_user_line(text, out),
            MessageContent::Blocks(blocks) => {
                for block in blocks {
                    if let ContentBlock::Text { text } = block {
                        push_user_line(text, out);
                    }
                }
            }
        },
        Role::Assistant => match &record.content {
            MessageContent::Text(text) => push_nonempty(text, out),
            MessageContent::Blocks(blocks) => {
                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => push_nonempty(text, out),
                        ContentBlock::ToolUse { name, input } => {
                            *has_state_change = true;
                            out.push(tool_descriptor(name, input));
                        }
                        ContentBlock::Other => {}
                    }
                }
            }
        },
    }
}

fn push_user_line(text: &str, out: &mut Vec<String>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(format!("USER: {}", truncate(trimmed, USER_TEXT_CAP)));
    }
}

fn push_nonempty(text: &str, out: &mut Vec<String>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Short bracketed summary of a tool invocation, with a type-specific
/// projection of its input: the target path for file tools, the command
/// for shell tools, otherwise the first recognizable argument.
fn tool_descriptor(name: &str, input: &serde_json::Value) -> String {
    let projection = match name {
        "Write" | "Edit" | "MultiEdit" | "NotebookEdit" | "Read" => {
            input.get("file_path").and_then(|v| v.as_str())
        }
        "Bash" => input.get("command").and_then(|v| v.as_str()),
        _ => ["file_path", "path", "pattern", "command", "query", "url"]
            .iter()
            .find_map(|key| input.get(key).and_then(|v| v.as_str())),
    };
    match projection {
        Some(arg) => format!("[{name}: {}]", truncate(arg.trim(), TOOL_ARG_CAP)),
        None => format!("[{name}]"),
    }
}

fn truncate(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        text.to_string()
    } else {
        let cut: String = text.chars().take(cap).collect();
        format!("{cut}...")
    }
}
