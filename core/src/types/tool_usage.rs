//! Recorded tool-call history feeding `UsagePatterns` (§4.7A).

use super::payload::{FieldValue, Payload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observed tool invocation, used to build aggregate usage patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub id: Uuid,
    pub project: String,
    pub session_id: Uuid,
    pub tool_name: String,
    pub context_files: Vec<String>,
    pub was_helpful: Option<bool>,
    pub recorded_at: DateTime<Utc>,
}

impl ToolUsage {
    #[must_use]
    pub fn payload(&self) -> ToolUsagePayload {
        ToolUsagePayload {
            project: self.project.clone(),
            session_id: self.session_id,
            tool_name: self.tool_name.clone(),
            context_files: self.context_files.clone(),
            was_helpful: self.was_helpful,
            recorded_at: self.recorded_at,
        }
    }
}

/// Tagged payload record for the `tool_usage` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUsagePayload {
    pub project: String,
    pub session_id: Uuid,
    pub tool_name: String,
    pub context_files: Vec<String>,
    pub was_helpful: Option<bool>,
    pub recorded_at: DateTime<Utc>,
}

impl Payload for ToolUsagePayload {
    fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("ToolUsagePayload is always serializable")
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "toolName" => Some(FieldValue::Text(self.tool_name.clone())),
            "contextFiles" => Some(FieldValue::Tags(self.context_files.clone())),
            "wasHelpful" => self.was_helpful.map(FieldValue::Bool),
            "timestamp" => Some(FieldValue::Timestamp(self.recorded_at)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_exposes_tool_name() {
        let usage = ToolUsage {
            id: Uuid::new_v4(),
            project: "acme".into(),
            session_id: Uuid::new_v4(),
            tool_name: "search_code".into(),
            context_files: vec!["src/lib.rs".into()],
            was_helpful: Some(true),
            recorded_at: Utc::now(),
        };
        let payload = usage.payload();
        assert_eq!(
            payload.field("toolName").unwrap().as_text(),
            Some("search_code")
        );
        assert_eq!(payload.field("wasHelpful").unwrap().as_bool(), Some(true));
    }
}
