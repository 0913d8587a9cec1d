//! In-memory stand-ins for every collaborator trait this crate depends on,
//! used by this crate's own unit tests. Kept as a local `#[cfg(test)]`
//! module (rather than depending on `ragmem-test-utils`) to avoid the
//! dev-dependency cycle that would otherwise build this crate twice.

use crate::engine::{
    EmbeddingProvider, KvEngine, LlmProvider, PointRecord, QualityGateProvider, QualityGateReport,
    ScoredPoint, ScrollPage, SearchRequest, UpsertPoint, VectorEngine,
};
use crate::error::{EngineError, Result};
use crate::types::Memory;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct StoredPoint {
    vector: Vec<f32>,
    payload: Value,
}

/// In-memory vector database. Search ranks by cosine similarity; there is
/// no real ANN index, which is fine at test scale.
#[derive(Default)]
pub struct InMemoryVectorEngine {
    collections: RwLock<HashMap<String, HashMap<String, StoredPoint>>>,
    aliases: RwLock<HashMap<String, String>>,
    snapshots: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryVectorEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(message: impl Into<String>) -> crate::error::Error {
    EngineError { status: 404, message: message.into() }.into()
}

fn mean_vector(vectors: &[Vec<f32>], dim: usize) -> Vec<f32> {
    let mut mean = vec![0.0_f32; dim];
    for vector in vectors {
        for (i, v) in vector.iter().enumerate() {
            mean[i] += v / vectors.len() as f32;
        }
    }
    mean
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorEngine for InMemoryVectorEngine {
    async fn ensure_collection(&self, collection: &str, _vector_size: usize) -> Result<()> {
        self.collections.write().entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<UpsertPoint>) -> Result<()> {
        let mut collections = self.collections.write();
        let store = collections.entry(collection.to_string()).or_default();
        for point in points {
            store.insert(point.id, StoredPoint { vector: point.vector, payload: point.payload });
        }
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.read();
        let Some(store) = collections.get(&request.collection) else {
            return Err(not_found(format!("collection '{}' missing", request.collection)));
        };
        if request.vector.is_empty() {
            return Err(EngineError { status: 400, message: "empty query vector".into() }.into());
        }

        let mut scored: Vec<ScoredPoint> = store
            .iter()
            .map(|(id, point)| ScoredPoint {
                id: id.clone(),
                score: cosine(&request.vector, &point.vector),
                payload: point.payload.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.limit);
        Ok(scored)
    }

    async fn delete(&self, collection: &str, ids: Vec<String>) -> Result<()> {
        let mut collections = self.collections.write();
        let Some(store) = collections.get_mut(collection) else {
            return Err(not_found(format!("collection '{collection}' missing")));
        };
        for id in ids {
            store.remove(&id);
        }
        Ok(())
    }

    async fn delete_by_filter(&self, collection: &str, filter: Value) -> Result<()> {
        let mut collections = self.collections.write();
        let Some(store) = collections.get_mut(collection) else {
            return Err(not_found(format!("collection '{collection}' missing")));
        };
        if let Some(value) = filter
            .pointer("/must/0/match/value")
            .and_then(Value::as_str)
        {
            if let Some(field) = filter.pointer("/must/0/key").and_then(Value::as_str) {
                store.retain(|_, point| point.payload.get(field).and_then(Value::as_str) != Some(value));
            }
        }
        Ok(())
    }

    async fn scroll(
        &self,
        collection: &str,
        _filter: Option<Value>,
        _offset: Option<String>,
        limit: usize,
    ) -> Result<ScrollPage> {
        let collections = self.collections.read();
        let Some(store) = collections.get(collection) else {
            return Err(not_found(format!("collection '{collection}' missing")));
        };
        let points = store
            .iter()
            .take(limit)
            .map(|(id, point)| PointRecord { id: id.clone(), payload: point.payload.clone() })
            .collect();
        Ok(ScrollPage { points, next_offset: None })
    }

    async fn aggregate_by_field(&self, collection: &str, field: &str) -> Result<Vec<(String, u64)>> {
        let collections = self.collections.read();
        let Some(store) = collections.get(collection) else {
            return Err(not_found(format!("collection '{collection}' missing")));
        };
        let mut counts: HashMap<String, u64> = HashMap::new();
        for point in store.values() {
            if let Some(value) = point.payload.get(field).and_then(Value::as_str) {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn recommend(
        &self,
        collection: &str,
        positive_ids: Vec<String>,
        negative_ids: Vec<String>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.read();
        let Some(store) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let positive: Vec<Vec<f32>> = positive_ids
            .iter()
            .filter_map(|id| store.get(id).map(|p| p.vector.clone()))
            .collect();
        if positive.is_empty() {
            return Ok(Vec::new());
        }
        let dim = positive[0].len();
        let mut pseudo = mean_vector(&positive, dim);

        let negative: Vec<Vec<f32>> = negative_ids
            .iter()
            .filter_map(|id| store.get(id).map(|p| p.vector.clone()))
            .collect();
        if !negative.is_empty() {
            let negative_mean = mean_vector(&negative, dim);
            for (p, n) in pseudo.iter_mut().zip(negative_mean.iter()) {
                *p -= n;
            }
        }

        let excluded: Vec<&String> = positive_ids.iter().chain(negative_ids.iter()).collect();
        let mut scored: Vec<ScoredPoint> = store
            .iter()
            .filter(|(id, _)| !excluded.contains(id))
            .map(|(id, point)| ScoredPoint {
                id: id.clone(),
                score: cosine(&pseudo, &point.vector),
                payload: point.payload.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn set_alias(&self, alias: &str, collection: &str) -> Result<()> {
        self.aliases.write().insert(alias.to_string(), collection.to_string());
        Ok(())
    }

    async fn list_aliases(&self) -> Result<Vec<(String, String)>> {
        Ok(self.aliases.read().iter().map(|(a, c)| (a.clone(), c.clone())).collect())
    }

    async fn create_snapshot(&self, collection: &str) -> Result<String> {
        let id = format!("{collection}-snapshot-{}", self.snapshots.read().get(collection).map_or(0, Vec::len));
        self.snapshots.write().entry(collection.to_string()).or_default().push(id.clone());
        Ok(id)
    }

    async fn list_snapshots(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self.snapshots.read().get(collection).cloned().unwrap_or_default())
    }

    async fn delete_snapshot(&self, collection: &str, snapshot: &str) -> Result<()> {
        if let Some(list) = self.snapshots.write().get_mut(collection) {
            list.retain(|s| s != snapshot);
        }
        Ok(())
    }

    async fn set_quantization(&self, _collection: &str, _enabled: bool, _quantile: f32) -> Result<()> {
        Ok(())
    }
}

/// In-memory key-value store with wall-clock TTL expiry, mirroring the
/// external cache's `get`-returns-`None`-on-miss-or-expiry contract.
#[derive(Default)]
pub struct InMemoryKvEngine {
    entries: RwLock<HashMap<String, (Vec<u8>, Instant)>>,
}

impl InMemoryKvEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvEngine for InMemoryKvEngine {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read();
        Ok(entries.get(key).filter(|(_, expires_at)| *expires_at > Instant::now()).map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.entries.write().insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn delete_matching(&self, prefix: &str) -> Result<u64> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

/// Deterministic fixed-dimension embedding provider: hashes the input text
/// into a repeatable pseudo-vector rather than calling a real model.
pub struct FixedEmbeddingProvider {
    dimension: usize,
}

impl FixedEmbeddingProvider {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbeddingProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let hash = crate::types::FileHashIndex::compute_hash(text.as_bytes());
        let bytes = hash.as_bytes();
        Ok((0..self.dimension)
            .map(|i| f32::from(bytes[i % bytes.len()]) / 255.0)
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "fixed-test-embedding"
    }
}

/// Returns the prompt unchanged, for tests that only care whether a
/// completion call happened.
pub struct EchoLlmProvider;

#[async_trait]
impl LlmProvider for EchoLlmProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }

    fn model_name(&self) -> &str {
        "echo-test-llm"
    }
}

/// Quality-gate provider that always passes, for tests exercising the
/// promotion path without caring about gate content.
pub struct AllowAllQualityGates;

#[async_trait]
impl QualityGateProvider for AllowAllQualityGates {
    async fn evaluate(&self, _candidate: &Memory) -> Result<QualityGateReport> {
        Ok(QualityGateReport { passed: true, gates: vec![] })
    }
}

/// Quality-gate provider that always fails one gate, for tests exercising
/// the promotion-rejection path.
pub struct RejectAllQualityGates;

#[async_trait]
impl QualityGateProvider for RejectAllQualityGates {
    async fn evaluate(&self, _candidate: &Memory) -> Result<QualityGateReport> {
        Ok(QualityGateReport {
            passed: false,
            gates: vec![crate::error::GateDetail {
                gate: "content-length".into(),
                passed: false,
                details: "content too short".into(),
                duration_ms: 1,
            }],
        })
    }
}
