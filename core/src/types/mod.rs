//! Shared data types (§3).
//!
//! Each collection gets its own tagged payload record rather than an open
//! `HashMap<String, Value>` — the REDESIGN FLAGS resolution for "dynamic
//! payload typing" in SPEC_FULL.md §3.

pub mod cache_stats;
pub mod chunk;
pub mod file_hash;
pub mod memory;
pub mod payload;
pub mod prediction;
pub mod query_pattern;
pub mod session;
pub mod tool_usage;

pub use cache_stats::CacheStats;
pub use chunk::{Chunk, ChunkPayload};
pub use file_hash::{FileHashEntry, FileHashIndex};
pub use memory::{Memory, MemoryPayload, MemorySource, MemoryType, QuarantineEntry, TodoStatus};
pub use payload::{FieldValue, Payload};
pub use prediction::{Prediction, PredictionStrategy, PredictionType};
pub use query_pattern::QueryPattern;
pub use session::{Session, SessionPayload, SessionStatus};
pub use tool_usage::{ToolUsage, ToolUsagePayload};

/// Build the standard `<projectName>_<suffix>` collection name (§3).
#[must_use]
pub fn collection_name(project: &str, suffix: &str) -> String {
    format!("{project}_{suffix}")
}

pub const SUFFIX_CODEBASE: &str = "codebase";
pub const SUFFIX_AGENT_MEMORY: &str = "agent_memory";
pub const SUFFIX_MEMORY_PENDING: &str = "memory_pending";
pub const SUFFIX_SESSIONS: &str = "sessions";
pub const SUFFIX_TOOL_USAGE: &str = "tool_usage";
pub const SUFFIX_SEARCH_FEEDBACK: &str = "search_feedback";
pub const SUFFIX_MEMORY_FEEDBACK: &str = "memory_feedback";
pub const SUFFIX_QUERY_PATTERNS: &str = "query_patterns";
pub const SUFFIX_CONFLUENCE: &str = "confluence";
