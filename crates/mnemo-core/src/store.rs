use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::CoreError;

/// The long-term memory document.
pub const MEMORY_DOC: &str = "MEMORY.md";
/// The living handoff document with the machine-owned capture section.
pub const HANDOFF_DOC: &str = "HANDOFF.md";
/// Per-session transcript cursors. Never synced.
pub const CURSOR_DOC: &str = ".cursors.json";
/// Divergence ledger written by the sync engine. Never synced.
pub const SYNC_STATE_DOC: &str = ".sync-state.json";

/// Whole-document store over one project's memory directory.
///
/// All writes replace the full document in a single operation so a
/// concurrent reader never observes a half-written document. There is no
/// cross-process lock; invocations are serialized by the hosting lifecycle.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    dir: PathBuf,
}

impl MemoryStore {
    /// Open the memory directory for a project. Created lazily on first write.
    pub fn for_project(settings: &Settings, project_path: &Path) -> Self {
        Self {
            dir: settings.project_dir(project_path),
        }
    }

    /// Open an explicit directory as a memory store.
    pub fn open(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn document_path(&self, name: &str) -> Result<PathBuf, CoreError> {
        // Document names are flat; anything path-like is rejected.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CoreError::InvalidDocumentName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }

    /// Read a document. `None` when it does not exist.
    pub fn read_document(&self, name: &str) -> Result<Option<String>, CoreError> {
        let path = self.document_path(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Io(e)),
        }
    }

    /// Write the full new content of a document in one operation.
    pub fn write_document(&self, name: &str, content: &str) -> Result<(), CoreError> {
        let path = self.document_path(name)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// List document names present in the store, sorted.
    pub fn list_documents(&self) -> Result<Vec<String>, CoreError> {
        let mut names = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(CoreError::Io(e)),
        };
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
