use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mnemo_core::{MemoryStore, Settings};

use super::{project_path, sync_engine};

#[derive(Args)]
pub struct PullArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,
}

pub fn run(args: &PullArgs) -> Result<()> {
    let settings = Settings::load()?;
    let project = project_path(args.project.as_deref())?;
    let store = MemoryStore::for_project(&settings, &project);

    let engine = sync_engine(&settings, &store)
        .context("Sync is not configured (set MNEMO_SYNC_REMOTE or clone into the sync dir)")?;
    let report = engine.pull()?;

    if report.updated.is_empty() {
        eprintln!("Already up to date.");
    } else {
        eprintln!("Updated {} document(s): {}", report.updated.len(), report.updated.join(", "));
    }
    for warning in &report.warnings {
        println!("mnemo: {warning}");
    }
    Ok(())
}
