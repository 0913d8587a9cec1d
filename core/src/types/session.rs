//! Session lifecycle state (§4.6).

use super::payload::{FieldValue, Payload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Lifecycle state of a coding-agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// In-memory + persisted view of a coding-agent working session.
///
/// `current_files` and `recent_queries` are bounded ring buffers
/// (`max_current_files` / `max_recent_queries` in [`crate::config::SessionConfig`]):
/// the oldest entry is evicted once the cap is hit, never an unbounded `Vec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub project: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Why this session ended: `"stale_cleanup"` for the reaper, unset for
    /// a caller-initiated `end_session`.
    pub end_reason: Option<String>,
    pub current_files: VecDeque<String>,
    pub recent_queries: VecDeque<String>,
    /// Features/concepts this session is actively touching. Unbounded
    /// within a session, deduplicated on insert.
    pub active_features: Vec<String>,
    /// Decisions recorded during this session, pushed as `auto_conversation`
    /// memories at session end. Unbounded within a session.
    pub decisions: Vec<String>,
    /// Set, by id, of the session this one resumed from (if any).
    pub resumed_from: Option<Uuid>,
}

impl Session {
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project: project.into(),
            status: SessionStatus::Active,
            started_at: now,
            last_activity_at: now,
            ended_at: None,
            end_reason: None,
            current_files: VecDeque::new(),
            recent_queries: VecDeque::new(),
            active_features: Vec::new(),
            decisions: Vec::new(),
            resumed_from: None,
        }
    }

    /// Record a file touched this session, evicting the oldest once `cap`
    /// is exceeded.
    pub fn push_file(&mut self, file: impl Into<String>, cap: usize) {
        push_bounded(&mut self.current_files, file.into(), cap);
    }

    /// Record a query issued this session, evicting the oldest once `cap`
    /// is exceeded.
    pub fn push_query(&mut self, query: impl Into<String>, cap: usize) {
        push_bounded(&mut self.recent_queries, query.into(), cap);
    }

    /// Copy resumable state (`current_files`, last 5 `recent_queries`,
    /// `active_features`, `decisions`) from a prior session, marking
    /// `resumed_from`.
    pub fn adopt_resume_source(&mut self, source: &Session) {
        self.current_files = source.current_files.clone();
        self.recent_queries = source.recent_queries.iter().rev().take(5).rev().cloned().collect();
        self.active_features = source.active_features.clone();
        self.decisions = source.decisions.clone();
        self.resumed_from = Some(source.id);
    }

    #[must_use]
    pub fn payload(&self) -> SessionPayload {
        SessionPayload {
            project: self.project.clone(),
            status: self.status,
            started_at: self.started_at,
            last_activity_at: self.last_activity_at,
            ended_at: self.ended_at,
            end_reason: self.end_reason.clone(),
            current_files: self.current_files.iter().cloned().collect(),
            recent_queries: self.recent_queries.iter().cloned().collect(),
            active_features: self.active_features.clone(),
        }
    }
}

fn push_bounded(buf: &mut VecDeque<String>, item: String, cap: usize) {
    if buf.back() == Some(&item) {
        return;
    }
    buf.push_back(item);
    while buf.len() > cap {
        buf.pop_front();
    }
}

/// Tagged payload record for the `sessions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub project: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<String>,
    pub current_files: Vec<String>,
    pub recent_queries: Vec<String>,
    pub active_features: Vec<String>,
}

impl Payload for SessionPayload {
    fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("SessionPayload is always serializable")
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "project" => Some(FieldValue::Text(self.project.clone())),
            "currentFiles" => Some(FieldValue::Tags(self.current_files.clone())),
            "timestamp" => Some(FieldValue::Timestamp(self.last_activity_at)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_file_evicts_oldest_past_cap() {
        let mut session = Session::new("acme");
        for i in 0..5 {
            session.push_file(format!("file{i}.rs"), 3);
        }
        assert_eq!(session.current_files.len(), 3);
        assert_eq!(session.current_files.front().unwrap(), "file2.rs");
        assert_eq!(session.current_files.back().unwrap(), "file4.rs");
    }

    #[test]
    fn push_file_ignores_immediate_repeat() {
        let mut session = Session::new("acme");
        session.push_file("a.rs", 10);
        session.push_file("a.rs", 10);
        assert_eq!(session.current_files.len(), 1);
    }
}
