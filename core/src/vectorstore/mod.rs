//! Vector store operations built on top of the injected [`VectorEngine`]
//! (§4.3).
//!
//! This module owns every piece of fallback and fusion logic the bare
//! engine trait doesn't: named-vector search falling back to an anonymous
//! vector on a `400`, RRF fusion when the engine has no native hybrid
//! search, and "404 means empty" across every read path.

mod rrf;

pub use rrf::reciprocal_rank_fusion;

use crate::engine::{ScoredPoint, SearchRequest, UpsertPoint, VectorEngine};
use crate::error::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Matches [`crate::config::RagConfig`]'s `upsert_batch_size` default; kept
/// as a local constant rather than threaded through `VectorStore::new`
/// since every existing call site constructs a store with no config.
const UPSERT_BATCH_SIZE: usize = 100;

/// Thin, retry/fallback-aware wrapper around one [`VectorEngine`].
#[derive(Clone)]
pub struct VectorStore {
    engine: Arc<dyn VectorEngine>,
}

impl VectorStore {
    #[must_use]
    pub fn new(engine: Arc<dyn VectorEngine>) -> Self {
        Self { engine }
    }

    #[instrument(skip(self))]
    pub async fn ensure_collection(&self, collection: &str, vector_size: usize) -> Result<()> {
        self.engine.ensure_collection(collection, vector_size).await
    }

    /// Assigns a fresh id to any id-less point (empty `id`), then upserts
    /// in batches of [`UPSERT_BATCH_SIZE`], awaiting each batch before
    /// issuing the next.
    #[instrument(skip(self, points))]
    pub async fn upsert(&self, collection: &str, points: Vec<UpsertPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let points: Vec<UpsertPoint> = points
            .into_iter()
            .map(|mut point| {
                if point.id.is_empty() {
                    point.id = Uuid::new_v4().to_string();
                }
                point
            })
            .collect();
        for batch in points.chunks(UPSERT_BATCH_SIZE) {
            self.engine.upsert(collection, batch.to_vec()).await?;
        }
        Ok(())
    }

    /// Dense search. A named-vector request that the engine rejects with a
    /// `400` is retried once as an anonymous vector before giving up; a
    /// `404` (missing collection) is swallowed into an empty result.
    #[instrument(skip(self, request))]
    pub async fn search(&self, request: SearchRequest) -> Result<Vec<ScoredPoint>> {
        match self.engine.search(request.clone()).await {
            Ok(points) => Ok(points),
            Err(Error::Engine(e)) if e.is_not_found() => Ok(Vec::new()),
            Err(Error::Engine(e)) if e.is_bad_request() && request.sparse_vector.is_some() => {
                let mut retry = request;
                retry.sparse_vector = None;
                match self.engine.search(retry).await {
                    Ok(points) => Ok(points),
                    Err(Error::Engine(e2)) if e2.is_not_found() => Ok(Vec::new()),
                    Err(other) => Err(other),
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Hybrid dense+sparse search. Attempts one native call first; if the
    /// engine has no combined dense+sparse support (signalled by a `400`),
    /// falls back to two independent dense-only and sparse-only searches
    /// fused client-side with Reciprocal Rank Fusion (`k = 60`).
    #[instrument(skip(self, request))]
    pub async fn search_hybrid_native(
        &self,
        request: SearchRequest,
        rrf_k: u32,
    ) -> Result<Vec<ScoredPoint>> {
        if request.sparse_vector.is_none() {
            return self.search(request).await;
        }

        match self.engine.search(request.clone()).await {
            Ok(points) => Ok(points),
            Err(Error::Engine(e)) if e.is_not_found() => Ok(Vec::new()),
            Err(Error::Engine(e)) if e.is_bad_request() => {
                let dense_request = SearchRequest {
                    sparse_vector: None,
                    ..request.clone()
                };
                let dense = self.search(dense_request).await?;
                // The engine has no sparse-only search surface of its own;
                // the sparse ranking is approximated by resubmitting the
                // same request without a dense vector component.
                let limit = request_limit(&request);
                let sparse_request = SearchRequest {
                    vector: Vec::new(),
                    ..request
                };
                let sparse = self.search(sparse_request).await.unwrap_or_default();
                Ok(reciprocal_rank_fusion(&[dense, sparse], rrf_k, limit))
            }
            Err(other) => Err(other),
        }
    }

    #[instrument(skip(self, ids))]
    pub async fn delete(&self, collection: &str, ids: Vec<String>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        match self.engine.delete(collection, ids).await {
            Err(Error::Engine(e)) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    #[instrument(skip(self, filter))]
    pub async fn delete_by_filter(&self, collection: &str, filter: Value) -> Result<()> {
        match self.engine.delete_by_filter(collection, filter).await {
            Err(Error::Engine(e)) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    #[instrument(skip(self, filter))]
    pub async fn scroll(
        &self,
        collection: &str,
        filter: Option<Value>,
        offset: Option<String>,
        limit: usize,
    ) -> Result<Vec<crate::engine::PointRecord>> {
        match self.engine.scroll(collection, filter, offset, limit).await {
            Ok(page) => Ok(page.points),
            Err(Error::Engine(e)) if e.is_not_found() => Ok(Vec::new()),
            Err(other) => Err(other),
        }
    }

    #[instrument(skip(self))]
    pub async fn aggregate_by_field(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Vec<(String, u64)>> {
        match self.engine.aggregate_by_field(collection, field).await {
            Err(Error::Engine(e)) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Candidates near one or more positive seed points and away from any
    /// negative seeds, used by auto-merge clustering and duplicate
    /// detection.
    #[instrument(skip(self, positive_ids, negative_ids))]
    pub async fn recommend(
        &self,
        collection: &str,
        positive_ids: Vec<String>,
        negative_ids: Vec<String>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        match self.engine.recommend(collection, positive_ids, negative_ids, limit).await {
            Err(Error::Engine(e)) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Near-duplicate groups: every point whose nearest neighbor scores
    /// above `threshold`, paired with that neighbor's id.
    #[instrument(skip(self, seed_ids))]
    pub async fn find_duplicates(
        &self,
        collection: &str,
        seed_ids: Vec<String>,
        threshold: f32,
    ) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        for seed in seed_ids {
            let candidates = self
                .recommend(collection, vec![seed.clone()], vec![], 1)
                .await?;
            if let Some(top) = candidates.into_iter().find(|p| p.score >= threshold) {
                pairs.push((seed, top.id));
            }
        }
        Ok(pairs)
    }

    /// `createAlias`/atomic `swapAlias`: point `alias` at `collection`.
    #[instrument(skip(self))]
    pub async fn set_alias(&self, alias: &str, collection: &str) -> Result<()> {
        self.engine.set_alias(alias, collection).await
    }

    #[instrument(skip(self))]
    pub async fn list_aliases(&self) -> Result<Vec<(String, String)>> {
        self.engine.list_aliases().await
    }

    #[instrument(skip(self))]
    pub async fn create_snapshot(&self, collection: &str) -> Result<String> {
        self.engine.create_snapshot(collection).await
    }

    #[instrument(skip(self))]
    pub async fn list_snapshots(&self, collection: &str) -> Result<Vec<String>> {
        self.engine.list_snapshots(collection).await
    }

    #[instrument(skip(self))]
    pub async fn delete_snapshot(&self, collection: &str, snapshot: &str) -> Result<()> {
        self.engine.delete_snapshot(collection, snapshot).await
    }

    /// Enable (`quantile` is the clip quantile) or disable scalar
    /// quantization on `collection`.
    #[instrument(skip(self))]
    pub async fn set_quantization(&self, collection: &str, enabled: bool, quantile: f32) -> Result<()> {
        self.engine.set_quantization(collection, enabled, quantile).await
    }
}

fn request_limit(request: &SearchRequest) -> usize {
    request.limit
}
