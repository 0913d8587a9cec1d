//! Codebase chunk points (§3).

use super::payload::{FieldValue, Payload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded substring of a source file, embedded as one vector.
///
/// Immutable per `(file, file_hash)`; the indexer deletes and reinserts
/// chunks wholesale when a file's hash changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: Uuid,
    pub file: String,
    pub content: String,
    pub language: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub project: String,
    pub indexed_at: DateTime<Utc>,
    pub file_hash: String,
}

impl Chunk {
    #[must_use]
    pub fn payload(&self) -> ChunkPayload {
        ChunkPayload {
            file: self.file.clone(),
            content: self.content.clone(),
            language: self.language.clone(),
            chunk_index: self.chunk_index,
            total_chunks: self.total_chunks,
            project: self.project.clone(),
            indexed_at: self.indexed_at,
            file_hash: self.file_hash.clone(),
        }
    }
}

/// Tagged payload record for the `codebase` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkPayload {
    pub file: String,
    pub content: String,
    pub language: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub project: String,
    pub indexed_at: DateTime<Utc>,
    pub file_hash: String,
}

impl Payload for ChunkPayload {
    fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("ChunkPayload is always serializable")
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "file" => Some(FieldValue::Text(self.file.clone())),
            "language" => Some(FieldValue::Text(self.language.clone())),
            "project" => Some(FieldValue::Text(self.project.clone())),
            "fileHash" => Some(FieldValue::Text(self.file_hash.clone())),
            "timestamp" => Some(FieldValue::Timestamp(self.indexed_at)),
            _ => None,
        }
    }
}
