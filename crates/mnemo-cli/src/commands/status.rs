use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use mnemo_core::store::HANDOFF_DOC;
use mnemo_core::{merge, MemoryStore, Settings};

use super::project_path;

/// Captures older than this are flagged as stale at session start.
const STALE_AFTER_DAYS: i64 = 7;

#[derive(Args)]
pub struct StatusArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let settings = Settings::load()?;
    let project = project_path(args.project.as_deref())?;
    let store = MemoryStore::for_project(&settings, &project);

    println!("Memory directory: {}", store.dir().display());
    let documents = store.list_documents()?;
    let visible: Vec<&String> = documents.iter().filter(|n| !n.starts_with('.')).collect();
    if visible.is_empty() {
        println!("No memory documents captured yet.");
    } else {
        println!("Documents:");
        for name in visible {
            println!("  {name}");
        }
    }

    if let Some(warning) = staleness_warning(&store, Utc::now()) {
        println!("mnemo: {warning}");
    }
    Ok(())
}

/// Advisory staleness warning for the handoff document's captured section.
pub fn staleness_warning(store: &MemoryStore, now: DateTime<Utc>) -> Option<String> {
    let handoff = store.read_document(HANDOFF_DOC).ok().flatten()?;
    let captured_at = merge::section_timestamp(&handoff)?;
    let age = now.signed_duration_since(captured_at);
    if age.num_days() >= STALE_AFTER_DAYS {
        Some(format!(
            "handoff context is {} days old; it may no longer reflect the project",
            age.num_days()
        ))
    } else {
        None
    }
}
