use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use mnemo_core::store::{MemoryStore, SYNC_STATE_DOC};
use mnemo_core::CoreError;

/// Per-document content hashes recorded at the last successful sync.
///
/// A repo copy that differs from both the recorded hash and the local
/// copy means the document changed on another machine while it also
/// changed here; the engine surfaces that as an advisory warning and
/// still lets the last writer win.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DivergenceLedger {
    hashes: BTreeMap<String, String>,
}

impl DivergenceLedger {
    /// Load the ledger. Missing or corrupt state reads as empty.
    pub fn load(store: &MemoryStore) -> Self {
        store
            .read_document(SYNC_STATE_DOC)
            .ok()
            .flatten()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, store: &MemoryStore) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)?;
        store.write_document(SYNC_STATE_DOC, &json)
    }

    pub fn recorded(&self, name: &str) -> Option<&str> {
        self.hashes.get(name).map(String::as_str)
    }

    pub fn record(&mut self, name: &str, hash: String) {
        self.hashes.insert(name.to_string(), hash);
    }
}

/// Sha256 hex digest of a document body.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
