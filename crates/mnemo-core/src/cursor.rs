use std::collections::BTreeMap;
use std::fs;
use std::io::{Read as _, Seek, SeekFrom, Write as _};

use crate::error::CoreError;
use crate::store::{MemoryStore, CURSOR_DOC};

/// Per-session transcript cursors for one project, stored as a single
/// JSON document mapping session id to the last consumed offset.
///
/// Reads are fail-soft: a missing or corrupt document reads as empty, so
/// the whole transcript is treated as new and simply re-filtered. Offsets
/// are monotonically non-decreasing per session.
pub struct CursorStore<'a> {
    store: &'a MemoryStore,
}

impl<'a> CursorStore<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Last consumed offset for a session, 0 when unknown.
    pub fn offset(&self, session_id: &str) -> u64 {
        self.load().get(session_id).copied().unwrap_or(0)
    }

    /// Record a new offset for a session. Full read-modify-write under an
    /// exclusive lock; a lower offset than the stored one is ignored.
    pub fn set_offset(&self, session_id: &str, offset: u64) -> Result<(), CoreError> {
        let path = self.store.document_path(CURSOR_DOC)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        fs2::FileExt::lock_exclusive(&file).map_err(CoreError::Io)?;

        let mut data = String::new();
        file.read_to_string(&mut data)?;
        // Corrupt state is overwritten, never fatal.
        let mut cursors: BTreeMap<String, u64> = match serde_json::from_str(&data) {
            Ok(cursors) => cursors,
            Err(e) => {
                if !data.is_empty() {
                    tracing::debug!("Discarding unreadable cursor document: {e}");
                }
                BTreeMap::new()
            }
        };
        let entry = cursors.entry(session_id.to_string()).or_insert(0);
        *entry = (*entry).max(offset);

        let json = serde_json::to_string_pretty(&cursors)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        fs2::FileExt::unlock(&file).map_err(CoreError::Io)?;
        Ok(())
    }

    fn load(&self) -> BTreeMap<String, u64> {
        let Ok(path) = self.store.document_path(CURSOR_DOC) else {
            return BTreeMap::new();
        };
        let Ok(file) = fs::OpenOptions::new().read(true).open(&path) else {
            return BTreeMap::new();
        };
        if fs2::FileExt::lock_shared(&file).is_err() {
            return BTreeMap::new();
        }
        let mut data = String::new();
        let result = (&file).read_to_string(&mut data);
        let _ = fs2::FileExt::unlock(&file);
        if result.is_err() {
            return BTreeMap::new();
        }
        serde_json::from_str(&data).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_cursor_reads_zero() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().join("proj"));
        let cursors = CursorStore::new(&store);
        assert_eq!(cursors.offset("s1"), 0);
    }

    #[test]
    fn test_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().join("proj"));
        let cursors = CursorStore::new(&store);
        cursors.set_offset("s1", 10).unwrap();
        cursors.set_offset("s2", 3).unwrap();
        assert_eq!(cursors.offset("s1"), 10);
        assert_eq!(cursors.offset("s2"), 3);
    }

    #[test]
    fn test_offsets_never_regress() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().join("proj"));
        let cursors = CursorStore::new(&store);
        cursors.set_offset("s1", 10).unwrap();
        cursors.set_offset("s1", 4).unwrap();
        assert_eq!(cursors.offset("s1"), 10);
    }

    #[test]
    fn test_corrupt_document_reads_empty_and_is_overwritten() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path().to_path_buf());
        store.write_document(CURSOR_DOC, "{not json").unwrap();

        let cursors = CursorStore::new(&store);
        assert_eq!(cursors.offset("s1"), 0);
        cursors.set_offset("s1", 7).unwrap();
        assert_eq!(cursors.offset("s1"), 7);
    }
}
