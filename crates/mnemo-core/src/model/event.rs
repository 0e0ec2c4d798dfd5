use std::path::PathBuf;

use serde::Deserialize;

/// Lifecycle event payload delivered on stdin by the hosting agent runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct HookPayload {
    pub session_id: String,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    pub cwd: PathBuf,
    pub hook_event_name: HookEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HookEventKind {
    SessionStart,
    UserPromptSubmit,
    Stop,
    PreCompact,
    SessionEnd,
}

impl HookPayload {
    /// Parse a payload from raw bytes read off stdin.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
