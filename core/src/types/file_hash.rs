//! Incremental-indexing file hash ledger (§4.4).

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tracked file's last-indexed content hash and chunk count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHashEntry {
    pub hash: String,
    pub chunk_count: usize,
}

/// Per-project map of file path to its last-indexed hash, used to diff an
/// incremental `indexProject` run against the previous index: unchanged
/// files are skipped, changed files are re-chunked, and files present in
/// the index but absent from the new file list are deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileHashIndex {
    entries: HashMap<String, FileHashEntry>,
}

impl FileHashIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Md5::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }

    /// `true` when `path` is absent or its stored hash differs from `hash`.
    #[must_use]
    pub fn is_changed(&self, path: &str, hash: &str) -> bool {
        self.entries.get(path).is_none_or(|entry| entry.hash != hash)
    }

    pub fn record(&mut self, path: impl Into<String>, hash: impl Into<String>, chunk_count: usize) {
        self.entries.insert(
            path.into(),
            FileHashEntry {
                hash: hash.into(),
                chunk_count,
            },
        );
    }

    pub fn remove(&mut self, path: &str) -> Option<FileHashEntry> {
        self.entries.remove(path)
    }

    /// Paths tracked by the index that are absent from `current_paths` — the
    /// set the indexer must delete from the vector store.
    #[must_use]
    pub fn stale_paths(&self, current_paths: &[String]) -> Vec<String> {
        self.entries
            .keys()
            .filter(|path| !current_paths.contains(path))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
