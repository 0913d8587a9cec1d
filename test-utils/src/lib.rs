//! In-memory collaborator mocks and fixture builders for `ragmem-core`'s
//! test suite.
//!
//! [`mock_engine`] implements every collaborator trait (`VectorEngine`,
//! `KvEngine`, `EmbeddingProvider`, `LlmProvider`, `QualityGateProvider`)
//! against plain in-process state, so the core crate's tests never talk to
//! a real vector database or LLM API. [`fixtures`] builds representative
//! domain values (memories, sessions, chunks) with sane defaults.

pub mod fixtures;
pub mod mock_engine;

pub use fixtures::*;
