//! Two-tier memory governance: quarantine ingestion, adaptive-threshold
//! gated promotion, and durable recall (§4.5).

mod threshold;

pub use threshold::compute_threshold;

use crate::config::ThresholdConfig;
use crate::embeddings::Embedder;
use crate::engine::{PointRecord, QualityGateProvider, UpsertPoint};
use crate::error::{Error, Result};
use crate::types::{
    collection_name, Memory, MemoryPayload, MemorySource, Payload, SUFFIX_AGENT_MEMORY,
    SUFFIX_MEMORY_PENDING,
};
use crate::vectorstore::VectorStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// A page of the quarantine collection scanned to locate one memory id is
/// capped at this many records; quarantine is expected to stay small since
/// memories are promoted or rejected promptly.
const QUARANTINE_SCAN_LIMIT: usize = 10_000;

struct ThresholdCache {
    value: f64,
    computed_at: Instant,
}

/// Outcome of one [`MemoryGovernance::ingest`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Written to `collection`.
    Stored { collection: String },
    /// An `Auto*`-sourced memory whose confidence fell below the project's
    /// adaptive threshold; nothing was written.
    Skipped { reason: &'static str },
}

/// Routes new memories through manual or automatic ingestion, and gates
/// promotion out of quarantine behind the adaptive confidence threshold and
/// the injected quality gates.
pub struct MemoryGovernance {
    store: Arc<VectorStore>,
    embedder: Arc<Embedder>,
    gates: Arc<dyn QualityGateProvider>,
    config: ThresholdConfig,
    threshold_cache: RwLock<HashMap<String, ThresholdCache>>,
}

impl MemoryGovernance {
    #[must_use]
    pub fn new(
        store: Arc<VectorStore>,
        embedder: Arc<Embedder>,
        gates: Arc<dyn QualityGateProvider>,
        config: ThresholdConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            gates,
            config,
            threshold_cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    /// Ingest a new memory. A `Manual` source goes straight to the durable
    /// collection. Every `Auto*` source must clear the project's adaptive
    /// confidence threshold to be quarantined at all (§4.5); below it, the
    /// memory is dropped without touching either collection.
    #[instrument(skip(self, memory, project))]
    pub async fn ingest(&self, project: &str, memory: Memory) -> Result<IngestOutcome> {
        let durable = memory.source == MemorySource::Manual;
        if !durable {
            let threshold = self.adaptive_threshold(project).await?;
            if f64::from(memory.confidence) < threshold {
                return Ok(IngestOutcome::Skipped { reason: "below_threshold" });
            }
        }
        let suffix = if durable {
            SUFFIX_AGENT_MEMORY
        } else {
            SUFFIX_MEMORY_PENDING
        };
        let collection = collection_name(project, suffix);
        self.store
            .ensure_collection(&collection, self.embedder.dimension())
            .await?;
        self.upsert_memory(project, &collection, &memory).await?;
        Ok(IngestOutcome::Stored { collection })
    }

    /// Promote a quarantined memory into the durable collection (§4.5
    /// steps 1-5): locate it in quarantine by id, optionally run the
    /// quality gates, then re-insert it under a fresh id carrying
    /// promotion provenance in `metadata`. Returns the new durable id.
    #[instrument(skip(self, evidence))]
    pub async fn promote(
        &self,
        project: &str,
        id: Uuid,
        reason: &str,
        evidence: Option<serde_json::Value>,
        run_gates: bool,
    ) -> Result<Uuid> {
        let pending = collection_name(project, SUFFIX_MEMORY_PENDING);
        let durable = collection_name(project, SUFFIX_AGENT_MEMORY);

        let candidate = self
            .find_quarantined(&pending, id)
            .await?
            .ok_or(Error::MemoryNotFound(id))?;

        if run_gates {
            let report = self.gates.evaluate(&candidate).await?;
            if !report.passed {
                return Err(Error::QualityGatesFailed { gates: report.gates });
            }
        }

        self.store.delete(&pending, vec![id.to_string()]).await?;

        let mut promoted = candidate;
        promoted.id = Uuid::new_v4();
        promoted.validated = true;
        let mut metadata = promoted.metadata;
        if !metadata.is_object() {
            metadata = serde_json::json!({});
        }
        metadata["validated"] = serde_json::json!(true);
        metadata["promoteReason"] = serde_json::json!(reason);
        metadata["promotedFrom"] = serde_json::json!(id.to_string());
        if let Some(evidence) = evidence {
            metadata["evidence"] = evidence;
        }
        promoted.metadata = metadata;

        self.upsert_memory(project, &durable, &promoted).await?;
        self.invalidate_threshold(project);
        Ok(promoted.id)
    }

    /// Reject a quarantined memory outright, removing it without promotion.
    #[instrument(skip(self))]
    pub async fn reject(&self, project: &str, memory_id: Uuid) -> Result<()> {
        let pending = collection_name(project, SUFFIX_MEMORY_PENDING);
        self.store.delete(&pending, vec![memory_id.to_string()]).await?;
        self.invalidate_threshold(project);
        Ok(())
    }

    /// Recall durable memories, optionally filtered by the engine's native
    /// scroll filter.
    #[instrument(skip(self))]
    pub async fn recall_durable(
        &self,
        project: &str,
        filter: Option<serde_json::Value>,
        limit: usize,
    ) -> Result<Vec<crate::engine::PointRecord>> {
        let durable = collection_name(project, SUFFIX_AGENT_MEMORY);
        self.store.scroll(&durable, filter, None, limit).await
    }

    /// Recall durable memories by semantic similarity to `query_text`,
    /// filtered to `score >= min_score`. Used for best-effort session
    /// briefings and conversation-analysis recall.
    #[instrument(skip(self, query_text))]
    pub async fn recall_similar(
        &self,
        project: &str,
        query_text: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<crate::engine::ScoredPoint>> {
        let durable = collection_name(project, SUFFIX_AGENT_MEMORY);
        let vector = self.embedder.embed(project, None, query_text).await?;
        let request = crate::engine::SearchRequest {
            collection: durable,
            vector,
            sparse_vector: None,
            limit,
            filter: None,
            score_threshold: Some(min_score),
        };
        self.store.search(request).await
    }

    async fn upsert_memory(&self, project: &str, collection: &str, memory: &Memory) -> Result<()> {
        let vector = self.embedder.embed(project, None, &memory.content).await?;
        let point = UpsertPoint {
            id: memory.id.to_string(),
            vector,
            payload: memory.payload().to_value(),
        };
        self.store.upsert(collection, vec![point]).await
    }

    /// Locate one memory in the quarantine collection by id via scroll and
    /// client-side filter on the point id (the engine trait has no
    /// get-by-id surface).
    async fn find_quarantined(&self, pending: &str, id: Uuid) -> Result<Option<Memory>> {
        let id_str = id.to_string();
        let records = self.store.scroll(pending, None, None, QUARANTINE_SCAN_LIMIT).await?;
        records
            .into_iter()
            .find(|record| record.id == id_str)
            .map(|record| Self::memory_from_record(&record))
            .transpose()
    }

    fn memory_from_record(record: &PointRecord) -> Result<Memory> {
        let payload: MemoryPayload = serde_json::from_value(record.payload.clone())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let id = Uuid::parse_str(&record.id).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Memory {
            id,
            memory_type: payload.memory_type,
            content: payload.content,
            tags: payload.tags,
            related_to: payload.related_to,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            metadata: payload.metadata,
            status: payload.status,
            status_history: vec![],
            source: payload.source,
            confidence: payload.confidence,
            validated: payload.validated,
        })
    }

    /// Adaptive confidence threshold for `project`, derived from the store
    /// (§4.5): `P` = durable memories whose source is `Auto*`, `Q` =
    /// quarantine size, `successRate = P / (P + Q)`. Cached per project for
    /// `cache_ttl` so a burst of ingests doesn't recompute it per-call.
    async fn adaptive_threshold(&self, project: &str) -> Result<f64> {
        {
            let cached = self.threshold_cache.read();
            if let Some(entry) = cached.get(project) {
                if entry.computed_at.elapsed() < self.config.cache_ttl {
                    return Ok(entry.value);
                }
            }
        }

        let durable = collection_name(project, SUFFIX_AGENT_MEMORY);
        let pending = collection_name(project, SUFFIX_MEMORY_PENDING);

        let durable_counts = self.store.aggregate_by_field(&durable, "source").await?;
        let durable_auto: u64 = durable_counts
            .iter()
            .filter(|(source, _)| source.starts_with("auto_"))
            .map(|(_, count)| *count)
            .sum();
        let pending_counts = self.store.aggregate_by_field(&pending, "source").await?;
        let quarantine: u64 = pending_counts.iter().map(|(_, count)| *count).sum();

        let total = durable_auto + quarantine;
        let success_rate = if total == 0 { 0.0 } else { durable_auto as f64 / total as f64 };
        let value = compute_threshold(&self.config, total, success_rate);

        self.threshold_cache.write().insert(
            project.to_string(),
            ThresholdCache { value, computed_at: Instant::now() },
        );
        Ok(value)
    }

    fn invalidate_threshold(&self, project: &str) {
        self.threshold_cache.write().remove(project);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::config::CacheTtls;
    use crate::types::{MemoryType, TodoStatus};
    use crate::test_support::{
        AllowAllQualityGates, FixedEmbeddingProvider, InMemoryKvEngine, InMemoryVectorEngine,
        RejectAllQualityGates,
    };

    fn governance() -> MemoryGovernance {
        let store = Arc::new(VectorStore::new(Arc::new(InMemoryVectorEngine::new())));
        let cache = Arc::new(Cache::new(Arc::new(InMemoryKvEngine::new()), CacheTtls::default()));
        let embedder = Arc::new(Embedder::new(Arc::new(FixedEmbeddingProvider::new(4)), cache));
        MemoryGovernance::new(
            store,
            embedder,
            Arc::new(AllowAllQualityGates),
            ThresholdConfig::default(),
        )
    }

    fn sample_memory(confidence: f32) -> Memory {
        Memory {
            id: uuid::Uuid::new_v4(),
            memory_type: MemoryType::Insight,
            content: "cache promotes on deeper hits".into(),
            tags: vec![],
            related_to: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            metadata: serde_json::json!({}),
            status: None::<TodoStatus>,
            status_history: vec![],
            source: MemorySource::AutoPattern,
            confidence,
            validated: false,
        }
    }

    #[tokio::test]
    async fn ingest_drops_auto_memory_below_cold_start_threshold() {
        let governance = governance();
        let memory = sample_memory(0.3);
        let outcome = governance.ingest("acme", memory).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Skipped { reason: "below_threshold" }));

        let pending = collection_name("acme", SUFFIX_MEMORY_PENDING);
        let durable = collection_name("acme", SUFFIX_AGENT_MEMORY);
        assert!(governance.store.scroll(&pending, None, None, 10).await.unwrap().is_empty());
        assert!(governance.store.scroll(&durable, None, None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ingest_quarantines_auto_memory_above_threshold() {
        let governance = governance();
        let memory = sample_memory(0.9);
        let outcome = governance.ingest("acme", memory).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Stored { .. }));
    }

    #[tokio::test]
    async fn promote_moves_quarantine_entry_into_durable_with_fresh_id() {
        let governance = governance();
        let memory = sample_memory(0.9);
        let original_id = memory.id;
        governance.ingest("acme", memory).await.unwrap();

        let promoted_id = governance
            .promote("acme", original_id, "reviewed", None, true)
            .await
            .unwrap();
        assert_ne!(promoted_id, original_id);

        let pending = collection_name("acme", SUFFIX_MEMORY_PENDING);
        let durable = collection_name("acme", SUFFIX_AGENT_MEMORY);
        assert!(governance.store.scroll(&pending, None, None, 10).await.unwrap().is_empty());
        let durable_points = governance.store.scroll(&durable, None, None, 10).await.unwrap();
        assert_eq!(durable_points.len(), 1);
        assert_eq!(durable_points[0].id, promoted_id.to_string());
        assert_eq!(durable_points[0].payload["metadata"]["promotedFrom"], original_id.to_string());
        assert_eq!(durable_points[0].payload["metadata"]["promoteReason"], "reviewed");
        assert_eq!(durable_points[0].payload["validated"], true);
    }

    #[tokio::test]
    async fn promote_missing_id_returns_memory_not_found() {
        let governance = governance();
        let missing = uuid::Uuid::new_v4();
        let result = governance.promote("acme", missing, "reviewed", None, true).await;
        assert!(matches!(result, Err(Error::MemoryNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn promote_leaves_both_collections_unmodified_on_gate_failure() {
        let store = Arc::new(VectorStore::new(Arc::new(InMemoryVectorEngine::new())));
        let cache = Arc::new(Cache::new(Arc::new(InMemoryKvEngine::new()), CacheTtls::default()));
        let embedder = Arc::new(Embedder::new(Arc::new(FixedEmbeddingProvider::new(4)), cache));
        let governance = MemoryGovernance::new(
            store,
            embedder,
            Arc::new(RejectAllQualityGates),
            ThresholdConfig::default(),
        );

        let memory = sample_memory(0.9);
        let original_id = memory.id;
        governance.ingest("acme", memory).await.unwrap();

        let result = governance.promote("acme", original_id, "reviewed", None, true).await;
        assert!(matches!(result, Err(Error::QualityGatesFailed { .. })));

        let pending = collection_name("acme", SUFFIX_MEMORY_PENDING);
        let durable = collection_name("acme", SUFFIX_AGENT_MEMORY);
        assert_eq!(governance.store.scroll(&pending, None, None, 10).await.unwrap().len(), 1);
        assert!(governance.store.scroll(&durable, None, None, 10).await.unwrap().is_empty());
    }
}
