//! Collaborator traits this crate depends on but does not implement (§6).
//!
//! The embedding application constructs and injects concrete adapters (a
//! real vector database client, a real key-value store, an HTTP embedding
//! API, an LLM client, a quality-gate runner). Everything in this module is
//! the seam those adapters plug into, mirroring the teacher's
//! `EmbeddingProvider`/`StorageBackend` split of "what we need" from "how
//! it's actually backed".

mod embedding_provider;
mod kv_engine;
mod llm_provider;
mod quality_gate;
mod vector_engine;

pub use embedding_provider::EmbeddingProvider;
pub use kv_engine::KvEngine;
pub use llm_provider::LlmProvider;
pub use quality_gate::{QualityGateProvider, QualityGateReport};
pub use vector_engine::{
    PointRecord, ScoredPoint, ScrollPage, SearchRequest, UpsertPoint, VectorEngine,
};
