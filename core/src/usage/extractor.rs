use crate::error::Result;
use crate::governance::MemoryGovernance;
use crate::types::{Memory, MemorySource, MemoryType};
use chrono::Utc;
use regex::Regex;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// One fixed provenance marker this extractor recognizes in conversation
/// text: the phrase pattern, the [`MemoryType`] it routes to, and the base
/// confidence before the code-identifier bonus.
struct Marker {
    pattern: Regex,
    memory_type: MemoryType,
    base_confidence: f32,
}

/// A line referencing a file path or an identifier-looking token earns a
/// confidence bump — it's more likely to be a grounded, actionable fact
/// than a stray remark.
fn mentions_code(line: &str) -> bool {
    static IDENTIFIER: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let pattern = IDENTIFIER.get_or_init(|| {
        Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\.[A-Za-z]{1,4}\b|[a-z]+_[a-z_]+|[A-Z][a-z]+[A-Z][A-Za-z]*")
            .expect("static pattern")
    });
    pattern.is_match(line)
}

/// Scans conversation text for a fixed set of provenance phrases ("we
/// decided", "I'll use", "TODO:", "we should", "note that", "important:")
/// and routes each match through [`MemoryGovernance::ingest`] as an
/// `auto_conversation` memory, letting the usual quarantine/adaptive-
/// threshold path decide whether it survives.
pub struct FactExtractor {
    governance: Arc<MemoryGovernance>,
    markers: Vec<Marker>,
}

impl FactExtractor {
    #[must_use]
    pub fn new(governance: Arc<MemoryGovernance>) -> Self {
        let markers = vec![
            Marker {
                pattern: Regex::new(r"(?mi)^.*\b(?:we decided|i'll use)\b[:,]?\s*(.+)$")
                    .expect("static pattern"),
                memory_type: MemoryType::Decision,
                base_confidence: 0.6,
            },
            Marker {
                pattern: Regex::new(r"(?mi)^\s*todo:\s*(.+)$").expect("static pattern"),
                memory_type: MemoryType::Todo,
                base_confidence: 0.65,
            },
            Marker {
                pattern: Regex::new(r"(?mi)^.*\bwe should\b[:,]?\s*(.+)$").expect("static pattern"),
                memory_type: MemoryType::Todo,
                base_confidence: 0.5,
            },
            Marker {
                pattern: Regex::new(r"(?mi)^.*\bnote that\b[:,]?\s*(.+)$").expect("static pattern"),
                memory_type: MemoryType::Insight,
                base_confidence: 0.5,
            },
            Marker {
                pattern: Regex::new(r"(?mi)^.*\bimportant:\s*(.+)$").expect("static pattern"),
                memory_type: MemoryType::Insight,
                base_confidence: 0.55,
            },
        ];
        Self { governance, markers }
    }

    /// Extract and ingest every marker match found in `text`, returning the
    /// number of memories ingested.
    #[instrument(skip(self, text))]
    pub async fn extract(&self, project: &str, text: &str) -> Result<usize> {
        let mut count = 0;
        for marker in &self.markers {
            for captures in marker.pattern.captures_iter(text) {
                let whole_line = &captures[0];
                let content = captures[1].trim().to_string();
                if content.is_empty() {
                    continue;
                }
                let confidence = if mentions_code(whole_line) {
                    (marker.base_confidence + 0.1).min(1.0)
                } else {
                    marker.base_confidence
                };
                let memory = Memory {
                    id: Uuid::new_v4(),
                    memory_type: marker.memory_type,
                    content,
                    tags: vec![],
                    related_to: vec![],
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    metadata: serde_json::json!({}),
                    status: matches!(marker.memory_type, MemoryType::Todo)
                        .then_some(crate::types::TodoStatus::Pending),
                    status_history: vec![],
                    source: MemorySource::AutoConversation,
                    confidence,
                    validated: false,
                };
                self.governance.ingest(project, memory).await?;
                count += 1;
            }
        }
        Ok(count)
    }
}
