use serde::Deserialize;

/// One record of the append-only session transcript (one JSONL line).
///
/// Transcripts are owned by the agent runtime; mnemo only ever reads them.
/// Records that fail to deserialize are skipped by the reader, never fatal.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptRecord {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Message content is either a plain string or an ordered list of blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    /// Anything else (tool_result, thinking, ...) carries no capture value.
    #[serde(other)]
    Other,
}
