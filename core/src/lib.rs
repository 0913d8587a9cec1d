#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

//! # RAG Memory Core
//!
//! Project-scoped retrieval-augmented memory for coding agents: a multi-
//! level embedding cache, an incremental codebase indexer, a vector-store
//! abstraction with hybrid-search fallback, and two-tier memory governance
//! for durable agent-written memories.
//!
//! This crate does not talk to a real vector database, key-value store,
//! embedding API, LLM, or quality-gate service. The embedding application
//! constructs concrete adapters for [`engine::VectorEngine`],
//! [`engine::KvEngine`], [`engine::EmbeddingProvider`],
//! [`engine::LlmProvider`], and [`engine::QualityGateProvider`] and injects
//! them; everything here is built against those traits.
//!
//! ## Module Organization
//!
//! - [`types`]: Shared data model — memories, sessions, chunks, payloads
//! - [`engine`]: Collaborator traits this crate depends on but doesn't implement
//! - [`vectorstore`]: `VectorEngine` wrapper with fallback/fusion logic
//! - [`cache`]: Three-level (session/project/global) TTL cache
//! - [`embeddings`]: Cached embedding access
//! - [`indexing`]: Incremental codebase chunking and indexing
//! - [`governance`]: Quarantine ingestion and adaptive-threshold promotion
//! - [`session`]: Session lifecycle, reaping, resume, and auto-merge
//! - [`predictive`]: Multi-strategy prefetch ranking and rate limiting
//! - [`usage`]: Tool-usage pattern tracking and conversation fact extraction
//! - [`retrieval`]: Query-facing semantic search built on the pieces above
//! - [`telemetry`]: Lock-free counters for hot-path instrumentation
//!
//! ## Quick Start
//!
//! ```no_run
//! use ragmem_core::cache::Cache;
//! use ragmem_core::config::RagConfig;
//! use ragmem_core::embeddings::Embedder;
//! use ragmem_core::engine::{EmbeddingProvider, KvEngine, VectorEngine};
//! use ragmem_core::vectorstore::VectorStore;
//! use std::sync::Arc;
//!
//! # async fn run(
//! #     vector_engine: Arc<dyn VectorEngine>,
//! #     kv_engine: Arc<dyn KvEngine>,
//! #     provider: Arc<dyn EmbeddingProvider>,
//! # ) -> ragmem_core::error::Result<()> {
//! let config = RagConfig::from_env();
//! let store = Arc::new(VectorStore::new(vector_engine));
//! let cache = Arc::new(Cache::new(kv_engine, config.cache_ttls.clone()));
//! let embedder = Arc::new(Embedder::new(provider, cache));
//!
//! let vector = embedder.embed("acme", None, "fn main() {}").await?;
//! store.ensure_collection("acme_codebase", vector.len()).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod governance;
pub mod indexing;
pub mod predictive;
pub mod retrieval;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod usage;
pub mod vectorstore;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
