use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Resolved paths for the mnemo memory root.
///
/// The root is `$MNEMO_HOME` when set, otherwise `~/.mnemo`. Each project
/// gets its own directory under `projects/`, keyed by the project path;
/// the shared sync working copy lives under `sync/`.
#[derive(Debug, Clone)]
pub struct Settings {
    root: PathBuf,
}

impl Settings {
    /// Resolve the memory root from the environment.
    pub fn load() -> Result<Self, CoreError> {
        let root = std::env::var_os("MNEMO_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".mnemo")))
            .ok_or(CoreError::NoMemoryRoot)?;
        Ok(Self { root })
    }

    /// Use an explicit root (tests, or callers that already resolved one).
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local working copy of the shared sync repository.
    pub fn sync_repo_dir(&self) -> PathBuf {
        self.root.join("sync")
    }

    /// Memory directory for one project.
    pub fn project_dir(&self, project_path: &Path) -> PathBuf {
        self.root.join("projects").join(project_key(project_path))
    }
}

/// Convert a project path to a flat directory key.
/// /Users/sjonas/myproject -> -Users-sjonas-myproject
pub fn project_key(path: &Path) -> String {
    path.to_string_lossy().replace(['/', '\\'], "-")
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
