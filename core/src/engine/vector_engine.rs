use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point to upsert: an id, a dense vector, and an opaque payload blob
/// produced by a [`crate::types::Payload::to_value`] call.
#[derive(Debug, Clone)]
pub struct UpsertPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// A point returned from search or recommend, with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: Value,
}

/// A point returned from scroll/get, without a score.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: String,
    pub payload: Value,
}

/// One page of a scroll cursor.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub points: Vec<PointRecord>,
    pub next_offset: Option<String>,
}

/// A dense (and optionally sparse) search request against one collection.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub collection: String,
    pub vector: Vec<f32>,
    pub sparse_vector: Option<Vec<(u32, f32)>>,
    pub limit: usize,
    pub filter: Option<Value>,
    pub score_threshold: Option<f32>,
}

/// External vector database. Every method maps to exactly one remote call;
/// retry, fallback, and fusion logic live in `vectorstore`, not here.
///
/// Implementations report errors via [`crate::error::EngineError`]'s numeric
/// `status`: `404` for missing collection/point, `400` for a malformed
/// request (callers use this to retry named-vector search as an anonymous
/// vector).
#[async_trait]
pub trait VectorEngine: Send + Sync {
    /// Create `collection` with the given vector size if it does not
    /// already exist. Idempotent.
    async fn ensure_collection(&self, collection: &str, vector_size: usize) -> Result<()>;

    /// Insert or overwrite points by id.
    async fn upsert(&self, collection: &str, points: Vec<UpsertPoint>) -> Result<()>;

    /// Dense (and optional hybrid) nearest-neighbor search. A `404` for a
    /// missing collection is the caller's signal to treat it as empty, not
    /// as an error to propagate.
    async fn search(&self, request: SearchRequest) -> Result<Vec<ScoredPoint>>;

    /// Delete points by id. No-op for ids that don't exist.
    async fn delete(&self, collection: &str, ids: Vec<String>) -> Result<()>;

    /// Delete every point matching `filter`.
    async fn delete_by_filter(&self, collection: &str, filter: Value) -> Result<()>;

    /// Page through a collection's points, optionally filtered.
    async fn scroll(
        &self,
        collection: &str,
        filter: Option<Value>,
        offset: Option<String>,
        limit: usize,
    ) -> Result<ScrollPage>;

    /// Distinct values (and counts) observed for `field` across a
    /// collection, used to build facet-style summaries.
    async fn aggregate_by_field(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Vec<(String, u64)>>;

    /// Nearest neighbors to one or more seed points, excluding the seeds
    /// themselves. Falls back to a pseudo-vector
    /// (`mean(positive) - mean(negative)`) when the engine has no native
    /// recommend endpoint.
    async fn recommend(
        &self,
        collection: &str,
        positive_ids: Vec<String>,
        negative_ids: Vec<String>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;

    /// Point a read alias at `collection`, replacing any prior target
    /// atomically. Used for both `createAlias` (alias absent) and the
    /// atomic `swapAlias` (alias already points elsewhere).
    async fn set_alias(&self, alias: &str, collection: &str) -> Result<()>;

    /// Every `(alias, collection)` pair currently registered.
    async fn list_aliases(&self) -> Result<Vec<(String, String)>>;

    /// Snapshot a collection for backup/restore, returning an engine-defined
    /// snapshot identifier.
    async fn create_snapshot(&self, collection: &str) -> Result<String>;

    /// Every snapshot identifier held for `collection`.
    async fn list_snapshots(&self, collection: &str) -> Result<Vec<String>>;

    /// Delete one snapshot by identifier.
    async fn delete_snapshot(&self, collection: &str, snapshot: &str) -> Result<()>;

    /// Enable or disable scalar quantization on `collection` with the given
    /// quantile.
    async fn set_quantization(&self, collection: &str, enabled: bool, quantile: f32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_point_carries_payload() {
        let point = UpsertPoint {
            id: "abc".into(),
            vector: vec![0.1, 0.2],
            payload: serde_json::json!({"file": "a.rs"}),
        };
        assert_eq!(point.payload["file"], "a.rs");
    }
}
