use std::path::{Path, PathBuf};

use clap::Subcommand;

use mnemo_core::{MemoryStore, Settings};
use mnemo_sync::SyncEngine;

pub mod hook;
pub mod pull;
pub mod push;
pub mod status;

#[derive(Subcommand)]
pub enum Commands {
    /// Lifecycle hook entry point (payload on stdin). Never fails.
    Hook(hook::HookArgs),
    /// Pull memory documents from the shared sync repository
    Pull(pull::PullArgs),
    /// Push memory documents to the shared sync repository
    Push(push::PushArgs),
    /// Show memory state and advisory warnings for a project
    Status(status::StatusArgs),
}

const SYNC_REMOTE_ENV: &str = "MNEMO_SYNC_REMOTE";

/// Open (or first-time clone) the sync engine for a project's store.
/// `None` when syncing is not configured; callers treat that as a no-op.
pub(crate) fn sync_engine(settings: &Settings, store: &MemoryStore) -> Option<SyncEngine> {
    let remote = std::env::var(SYNC_REMOTE_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty());
    mnemo_sync::open_or_clone(&settings.sync_repo_dir(), remote.as_deref(), store.clone())
}

pub(crate) fn project_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}
