//! Incremental codebase indexer (§4.4).
//!
//! File discovery is out of scope here — callers supply the file list
//! (typically from their own walker/watcher) as [`DiscoveredFile`] records.
//! This module owns chunking, hash-diffing against the previous run,
//! batched embedding, and the upsert/delete reconciliation against the
//! vector store.

mod chunker;
mod progress;

pub use progress::IndexProgress;

use crate::config::IndexerConfig;
use crate::embeddings::Embedder;
use crate::engine::UpsertPoint;
use crate::error::{Error, Result};
use crate::types::{collection_name, Chunk, FileHashIndex, Payload, SUFFIX_CODEBASE};
use crate::vectorstore::VectorStore;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// One file handed to the indexer by its caller.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: String,
    pub content: String,
    pub language: String,
}

/// Outcome of one `index_project` run.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub files_indexed: usize,
    pub chunks_indexed: usize,
    pub files_deleted: usize,
}

/// Coordinates chunking, embedding, and upsert for a project's codebase
/// collection, tracking a single active run per project at a time.
pub struct Indexer {
    store: Arc<VectorStore>,
    embedder: Arc<Embedder>,
    config: IndexerConfig,
    progress: Mutex<HashMap<String, IndexProgress>>,
    hashes: Mutex<HashMap<String, FileHashIndex>>,
}

impl Indexer {
    #[must_use]
    pub fn new(store: Arc<VectorStore>, embedder: Arc<Embedder>, config: IndexerConfig) -> Self {
        Self {
            store,
            embedder,
            config,
            progress: Mutex::new(HashMap::new()),
            hashes: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn progress(&self, project: &str) -> IndexProgress {
        self.progress
            .lock()
            .get(project)
            .cloned()
            .unwrap_or(IndexProgress::Idle)
    }

    /// Incrementally index `files` for `project`: unchanged files are
    /// skipped, changed ones are re-chunked and re-embedded, and files
    /// previously indexed but absent from `files` are deleted.
    #[instrument(skip(self, files))]
    pub async fn index_project(
        &self,
        project: &str,
        files: Vec<DiscoveredFile>,
    ) -> Result<IndexReport> {
        if self.progress(project).is_active() {
            return Err(Error::AlreadyIndexing(project.to_string()));
        }
        self.progress.lock().insert(
            project.to_string(),
            IndexProgress::Indexing {
                files_total: files.len(),
                files_done: 0,
                chunks_indexed: 0,
            },
        );

        let result = self.run_index(project, files).await;

        let final_state = match &result {
            Ok(report) => IndexProgress::Completed {
                files_indexed: report.files_indexed,
                chunks_indexed: report.chunks_indexed,
                files_deleted: report.files_deleted,
            },
            Err(e) => IndexProgress::Error {
                message: e.to_string(),
            },
        };
        self.progress.lock().insert(project.to_string(), final_state);

        result
    }

    async fn run_index(&self, project: &str, files: Vec<DiscoveredFile>) -> Result<IndexReport> {
        let collection = collection_name(project, SUFFIX_CODEBASE);
        self.store
            .ensure_collection(&collection, self.embedder.dimension())
            .await?;

        let current_paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        let mut index = self
            .hashes
            .lock()
            .get(project)
            .cloned()
            .unwrap_or_default();

        let stale = index.stale_paths(&current_paths);
        for path in &stale {
            self.store
                .delete_by_filter(
                    &collection,
                    serde_json::json!({"must": [{"key": "file", "match": {"value": path}}]}),
                )
                .await?;
            index.remove(path);
        }

        let mut files_indexed = 0;
        let mut chunks_indexed = 0;

        for batch in files.chunks(self.config.file_batch_size) {
            for file in batch {
                let hash = FileHashIndex::compute_hash(file.content.as_bytes());
                if !index.is_changed(&file.path, &hash) {
                    continue;
                }

                self.store
                    .delete_by_filter(
                        &collection,
                        serde_json::json!({"must": [{"key": "file", "match": {"value": file.path}}]}),
                    )
                    .await?;

                let pieces = chunker::chunk_file(
                    &file.content,
                    self.config.max_chunk_chars,
                    self.config.min_chunk_non_whitespace_chars,
                );
                let total = pieces.len();
                let now = Utc::now();

                for batch_of_text in pieces.chunks(self.config.embedding_batch_size) {
                    let vectors = self
                        .embedder
                        .embed_batch(
                            project,
                            None,
                            &batch_of_text.iter().cloned().collect::<Vec<_>>(),
                        )
                        .await?;

                    let mut points = Vec::with_capacity(batch_of_text.len());
                    for (offset, (text, vector)) in
                        batch_of_text.iter().zip(vectors.into_iter()).enumerate()
                    {
                        let chunk = Chunk {
                            id: Uuid::new_v4(),
                            file: file.path.clone(),
                            content: text.clone(),
                            language: file.language.clone(),
                            chunk_index: offset,
                            total_chunks: total,
                            project: project.to_string(),
                            indexed_at: now,
                            file_hash: hash.clone(),
                        };
                        points.push(UpsertPoint {
                            id: chunk.id.to_string(),
                            vector,
                            payload: chunk.payload().to_value(),
                        });
                    }
                    self.store.upsert(&collection, points).await?;
                }

                chunks_indexed += total;
                index.record(&file.path, &hash, total);
                files_indexed += 1;
            }
        }

        self.hashes.lock().insert(project.to_string(), index);

        Ok(IndexReport {
            files_indexed,
            chunks_indexed,
            files_deleted: stale.len(),
        })
    }
}
