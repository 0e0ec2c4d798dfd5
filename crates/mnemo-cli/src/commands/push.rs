use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mnemo_core::{MemoryStore, Settings};

use super::{project_path, sync_engine};

#[derive(Args)]
pub struct PushArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,
}

pub fn run(args: &PushArgs) -> Result<()> {
    let settings = Settings::load()?;
    let project = project_path(args.project.as_deref())?;
    let store = MemoryStore::for_project(&settings, &project);

    let engine = sync_engine(&settings, &store)
        .context("Sync is not configured (set MNEMO_SYNC_REMOTE or clone into the sync dir)")?;
    let report = engine.push()?;

    if report.committed {
        eprintln!(
            "Pushed {} document(s): {}",
            report.copied.len(),
            report.copied.join(", ")
        );
    } else {
        eprintln!("Nothing to push.");
    }
    if !report.pulled_in.is_empty() {
        eprintln!("Pulled in from other machines: {}", report.pulled_in.join(", "));
    }
    Ok(())
}
