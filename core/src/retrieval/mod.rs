//! Query-facing retrieval: embed, check the search cache, fall through to
//! the vector store, and cache the result (§4.3, §4.2).

use crate::cache::{Cache, Level};
use crate::embeddings::Embedder;
use crate::engine::{ScoredPoint, SearchRequest};
use crate::error::{Error, Result};
use crate::vectorstore::VectorStore;
use std::sync::Arc;
use tracing::instrument;

/// Combines an [`Embedder`], the search-result [`Cache`], and a
/// [`VectorStore`] into the single entry point the thin tool surface calls
/// for a natural-language query.
pub struct Retrieval {
    embedder: Arc<Embedder>,
    cache: Arc<Cache>,
    store: Arc<VectorStore>,
}

impl Retrieval {
    #[must_use]
    pub fn new(embedder: Arc<Embedder>, cache: Arc<Cache>, store: Arc<VectorStore>) -> Self {
        Self { embedder, cache, store }
    }

    /// Semantic search over `collection`: cache hit short-circuits the
    /// embed + vector-store round trip entirely. The search cache is
    /// session-scoped when `session` is given and project-scoped otherwise
    /// (§4.2's two-level session/project search cache).
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        project: &str,
        session: Option<&str>,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let (level, scope) = match session {
            Some(session) => (Level::Session, session),
            None => (Level::Project, project),
        };
        if let Some(cached) = self.cache.get_search(level, scope, query).await? {
            let points: Vec<ScoredPoint> = serde_json::from_slice(&cached)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            return Ok(points);
        }

        let vector = self.embedder.embed(project, session, query).await?;
        let request = SearchRequest {
            collection: collection.to_string(),
            vector,
            sparse_vector: None,
            limit,
            filter: None,
            score_threshold: None,
        };
        let points = self.store.search(request).await?;

        let serialized =
            serde_json::to_vec(&points).map_err(|e| Error::Serialization(e.to_string()))?;
        self.cache.set_search(level, scope, query, serialized).await?;

        Ok(points)
    }

    /// Points whose nearest neighbor scores above `threshold`, surfaced as
    /// likely duplicates.
    #[instrument(skip(self, seed_ids))]
    pub async fn find_duplicates(
        &self,
        collection: &str,
        seed_ids: Vec<String>,
        threshold: f32,
    ) -> Result<Vec<(String, String)>> {
        self.store.find_duplicates(collection, seed_ids, threshold).await
    }

    /// Distinct values observed for `field`, used to build facet summaries.
    #[instrument(skip(self))]
    pub async fn aggregate_by_field(&self, collection: &str, field: &str) -> Result<Vec<(String, u64)>> {
        self.store.aggregate_by_field(collection, field).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheTtls;
    use crate::engine::UpsertPoint;
    use crate::test_support::{FixedEmbeddingProvider, InMemoryKvEngine, InMemoryVectorEngine};

    fn retrieval() -> Retrieval {
        let engine = Arc::new(InMemoryVectorEngine::new());
        let store = Arc::new(VectorStore::new(engine));
        let cache = Arc::new(Cache::new(Arc::new(InMemoryKvEngine::new()), CacheTtls::default()));
        let embedder = Arc::new(Embedder::new(Arc::new(FixedEmbeddingProvider::new(4)), cache.clone()));
        Retrieval::new(embedder, cache, store)
    }

    #[tokio::test]
    async fn search_finds_upserted_point() {
        let retrieval = retrieval();
        retrieval.store.ensure_collection("acme_codebase", 4).await.unwrap();
        let vector = retrieval.embedder.embed("acme", None, "needle").await.unwrap();
        retrieval
            .store
            .upsert(
                "acme_codebase",
                vec![UpsertPoint {
                    id: "p1".into(),
                    vector,
                    payload: serde_json::json!({"file": "a.rs"}),
                }],
            )
            .await
            .unwrap();

        let results = retrieval
            .search("acme", None, "acme_codebase", "needle", 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }
}
