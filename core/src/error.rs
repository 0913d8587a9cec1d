//! Crate-wide error taxonomy.
//!
//! Mirrors the shape of the teacher's flat `thiserror` enum: one variant per
//! failure kind, an `is_recoverable()` classifier, and `#[from]` conversions
//! for the sub-domain error types raised by collaborators.

use uuid::Uuid;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by the vector-engine collaborator.
///
/// `status` mirrors the numeric HTTP-ish status the external engine reports:
/// `404` means "collection or point missing", `400` means "bad request"
/// (which triggers the named/anonymous-vector search fallback).
#[derive(Debug, Clone, thiserror::Error)]
#[error("vector engine error (status {status}): {message}")]
pub struct EngineError {
    pub status: u16,
    pub message: String,
}

impl EngineError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.status == 400
    }
}

/// Error returned by the key-value cache collaborator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cache error: {0}")]
pub struct CacheError(pub String);

/// Per-gate detail reported by a failed quality-gate run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GateDetail {
    pub gate: String,
    pub passed: bool,
    pub details: String,
    pub duration_ms: u64,
}

/// Error types for the retrieval and memory core.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("vector engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("validation failed for field '{0}'")]
    Validation(String),

    #[error("memory not found: {0}")]
    MemoryNotFound(Uuid),

    #[error("quality gates failed")]
    QualityGatesFailed { gates: Vec<GateDetail> },

    #[error("already indexing project '{0}'")]
    AlreadyIndexing(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("agent timeout")]
    AgentTimeout,

    #[error("agent exceeded max iterations")]
    AgentMaxIterations,
}

impl Error {
    /// Whether a caller may usefully retry this error with backoff.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Engine(e) => !e.is_not_found(),
            Error::Cache(_) | Error::ProviderUnavailable(_) => true,
            Error::InvalidQuery(_)
            | Error::Validation(_)
            | Error::MemoryNotFound(_)
            | Error::QualityGatesFailed { .. }
            | Error::AlreadyIndexing(_)
            | Error::Configuration(_)
            | Error::Serialization(_)
            | Error::AgentTimeout
            | Error::AgentMaxIterations => false,
        }
    }

    /// True when a vector-engine 404 should be swallowed into an empty
    /// result rather than surfaced as an error (search/get semantics).
    #[must_use]
    pub fn is_engine_not_found(&self) -> bool {
        matches!(self, Error::Engine(e) if e.is_not_found())
    }
}

/// Sum type for LLM JSON-structured responses: parse or keep the raw text.
///
/// Used by review/test-generation/architecture tool templates (out of
/// scope) when asking the LLM collaborator for structured output — a
/// `ParseFailure` must never discard the model's raw answer.
#[derive(Debug, Clone)]
pub enum LlmJsonResult<T> {
    Structured(T),
    RawText(String),
}

impl<T> LlmJsonResult<T> {
    /// Attempt to parse `raw` as JSON into `T`, falling back to `RawText`.
    pub fn parse(raw: impl Into<String>) -> Self
    where
        T: serde::de::DeserializeOwned,
    {
        let raw = raw.into();
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => LlmJsonResult::Structured(value),
            Err(_) => LlmJsonResult::RawText(raw),
        }
    }
}
