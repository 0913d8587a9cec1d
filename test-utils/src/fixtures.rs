//! Fixture builders with sane defaults, for tests that care about one
//! field and don't want to restate every other one.

use chrono::Utc;
use ragmem_core::types::{
    Chunk, Memory, MemorySource, MemoryType, Session, ToolUsage,
};
use uuid::Uuid;

/// A minimal `Decision` memory with the given content.
#[must_use]
pub fn test_memory(content: &str) -> Memory {
    Memory {
        id: Uuid::new_v4(),
        memory_type: MemoryType::Decision,
        content: content.to_string(),
        tags: vec![],
        related_to: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
        metadata: serde_json::json!({}),
        status: None,
        status_history: vec![],
        source: MemorySource::Manual,
        confidence: 0.8,
        validated: false,
    }
}

/// A memory from an automatic source, useful for exercising the
/// quarantine/promotion path.
#[must_use]
pub fn test_quarantined_memory(content: &str, confidence: f32) -> Memory {
    Memory {
        source: MemorySource::AutoPattern,
        confidence,
        ..test_memory(content)
    }
}

/// A one-chunk file fixture.
#[must_use]
pub fn test_chunk(project: &str, file: &str, content: &str) -> Chunk {
    Chunk {
        id: Uuid::new_v4(),
        file: file.to_string(),
        content: content.to_string(),
        language: "rust".to_string(),
        chunk_index: 0,
        total_chunks: 1,
        project: project.to_string(),
        indexed_at: Utc::now(),
        file_hash: ragmem_core::types::FileHashIndex::compute_hash(content.as_bytes()),
    }
}

/// A fresh active session for `project`.
#[must_use]
pub fn test_session(project: &str) -> Session {
    Session::new(project)
}

/// A single recorded tool call.
#[must_use]
pub fn test_tool_usage(project: &str, session_id: Uuid, tool_name: &str) -> ToolUsage {
    ToolUsage {
        id: Uuid::new_v4(),
        project: project.to_string(),
        session_id,
        tool_name: tool_name.to_string(),
        context_files: vec![],
        was_helpful: None,
        recorded_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_defaults_to_manual_source() {
        let memory = test_memory("remember this");
        assert_eq!(memory.source, MemorySource::Manual);
        assert_eq!(memory.content, "remember this");
    }

    #[test]
    fn test_quarantined_memory_overrides_source_and_confidence() {
        let memory = test_quarantined_memory("auto-detected", 0.45);
        assert_eq!(memory.source, MemorySource::AutoPattern);
        assert!((memory.confidence - 0.45).abs() < 1e-6);
    }
}
