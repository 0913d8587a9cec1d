//! Durable and quarantined agent memories (§3, §4.5).

use super::payload::{FieldValue, Payload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of durable memory a coding agent can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Decision,
    Insight,
    Context,
    Todo,
    Conversation,
    Note,
}

/// Where a memory originated, used to weight confidence and auto-merge
/// eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    Manual,
    AutoConversation,
    AutoPattern,
    AutoFeedback,
}

/// Lifecycle status for `MemoryType::Todo` memories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Done,
    Cancelled,
}

/// One recorded status transition, appended whenever a todo's status
/// changes so the history is auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: TodoStatus,
    pub changed_at: DateTime<Utc>,
}

/// A single durable or quarantined fact an agent chose to remember.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub memory_type: MemoryType,
    pub content: String,
    pub tags: Vec<String>,
    pub related_to: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub status: Option<TodoStatus>,
    pub status_history: Vec<StatusChange>,
    pub source: MemorySource,
    pub confidence: f32,
    pub validated: bool,
}

impl Memory {
    #[must_use]
    pub fn payload(&self) -> MemoryPayload {
        MemoryPayload {
            memory_type: self.memory_type,
            content: self.content.clone(),
            tags: self.tags.clone(),
            related_to: self.related_to.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            metadata: self.metadata.clone(),
            status: self.status,
            source: self.source,
            confidence: self.confidence,
            validated: self.validated,
        }
    }
}

/// Tagged payload record for `agent_memory` and `memory_pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPayload {
    pub memory_type: MemoryType,
    pub content: String,
    pub tags: Vec<String>,
    pub related_to: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: serde_json::Value,
    pub status: Option<TodoStatus>,
    pub source: MemorySource,
    pub confidence: f32,
    pub validated: bool,
}

impl Payload for MemoryPayload {
    fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("MemoryPayload is always serializable")
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "content" => Some(FieldValue::Text(self.content.clone())),
            "tags" => Some(FieldValue::Tags(self.tags.clone())),
            "confidence" => Some(FieldValue::Number(f64::from(self.confidence))),
            "validated" => Some(FieldValue::Bool(self.validated)),
            "timestamp" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// A memory sitting in the `memory_pending` quarantine collection, awaiting
/// promotion or rejection by `MemoryGovernance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineEntry {
    pub memory: Memory,
    pub quarantined_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Memory {
        Memory {
            id: Uuid::new_v4(),
            memory_type: MemoryType::Decision,
            content: "use RRF for hybrid search".into(),
            tags: vec!["retrieval".into()],
            related_to: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            metadata: serde_json::json!({}),
            status: None,
            status_history: vec![],
            source: MemorySource::Manual,
            confidence: 0.9,
            validated: false,
        }
    }

    #[test]
    fn payload_field_lookup_covers_confidence() {
        let payload = sample().payload();
        assert_eq!(
            payload.field("confidence").unwrap().as_text(),
            None // Number, not Text
        );
        assert!(matches!(
            payload.field("confidence"),
            Some(FieldValue::Number(n)) if (n - 0.9_f64).abs() < 1e-6
        ));
    }

    #[test]
    fn quarantine_entry_wraps_memory() {
        let memory = sample();
        let entry = QuarantineEntry {
            memory: memory.clone(),
            quarantined_at: memory.created_at,
        };
        assert_eq!(entry.memory.id, memory.id);
    }
}
