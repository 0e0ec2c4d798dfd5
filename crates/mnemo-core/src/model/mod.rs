pub mod event;
pub mod transcript;

pub use event::{HookEventKind, HookPayload};
pub use transcript::{ContentBlock, MessageContent, Role, TranscriptRecord};
