//! Session lifecycle: start/resume, bounded activity tracking, and
//! end-of-session auto-save (§4.6).

mod automerge;
mod entities;
mod reaper;

pub use automerge::{run_auto_merge, AutoMergeOutcome};
pub use entities::{ExtractedEntities, RegexEntityExtractor, SyntaxExtractor};
pub use reaper::{is_resumable, is_stale};

use crate::cache::Cache;
use crate::config::SessionConfig;
use crate::engine::UpsertPoint;
use crate::error::Result;
use crate::governance::MemoryGovernance;
use crate::types::{
    collection_name, Memory, MemorySource, MemoryType, Payload, Session, SessionStatus,
    SUFFIX_SESSIONS,
};
use crate::vectorstore::VectorStore;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// In-memory session table backed by the `sessions` collection for
/// durability across process restarts.
pub struct SessionManager {
    store: Arc<VectorStore>,
    governance: Arc<MemoryGovernance>,
    cache: Arc<Cache>,
    config: SessionConfig,
    vector_size: usize,
    active: RwLock<HashMap<Uuid, Session>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        store: Arc<VectorStore>,
        governance: Arc<MemoryGovernance>,
        cache: Arc<Cache>,
        config: SessionConfig,
        vector_size: usize,
    ) -> Self {
        Self {
            store,
            governance,
            cache,
            config,
            vector_size,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Reap every active session past `stale_after`, then either resume the
    /// most recent resumable session for `project` or start a fresh one.
    /// `initial_context`, if given, is scanned for file paths and PascalCase
    /// concepts which seed the new session's `current_files`/`tags`.
    #[instrument(skip(self, initial_context))]
    pub async fn start_session(
        &self,
        project: &str,
        initial_context: Option<&str>,
    ) -> Result<Session> {
        self.reap_stale().await?;

        let collection = collection_name(project, SUFFIX_SESSIONS);
        self.store.ensure_collection(&collection, self.vector_size).await?;

        let mut session = Session::new(project);
        if let Some(source) = self.find_resumable(project) {
            session.adopt_resume_source(&source);
            self.cache
                .warm_session(
                    project,
                    &session.id.to_string(),
                    self.governance.embedding_model(),
                    session.recent_queries.iter().cloned().collect::<Vec<_>>().as_slice(),
                )
                .await;
        }
        if let Some(text) = initial_context {
            let entities = RegexEntityExtractor.extract(text);
            for file in entities.files {
                session.push_file(file, self.config.max_current_files);
            }
            session.active_features.extend(entities.features);
            session.active_features.sort();
            session.active_features.dedup();
        }
        self.persist(&collection, &session).await?;
        self.active.write().insert(session.id, session.clone());
        Ok(session)
    }

    /// Build a best-effort briefing string: top durable memories matching
    /// `active_features` union the last 3 recent queries, at `score >= 0.6`.
    /// Never fails the caller — returns `None` on any recall error.
    #[instrument(skip(self))]
    pub async fn build_briefing(&self, session: &Session) -> Option<String> {
        let mut query_terms: Vec<String> = session.active_features.clone();
        query_terms.extend(session.recent_queries.iter().rev().take(3).cloned());
        if query_terms.is_empty() {
            return None;
        }
        let query_text = query_terms.join(" ");
        let recall = self.governance.recall_similar(&session.project, &query_text, 5, 0.6);
        let memories = tokio::time::timeout(self.config.enrichment_deadline, recall)
            .await
            .ok()?
            .ok()?;
        if memories.is_empty() {
            return None;
        }
        let highlights: Vec<String> = memories
            .iter()
            .filter_map(|point| point.payload.get("content").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect();
        Some(format!(
            "Project {}: {} relevant memor{} recalled — {}",
            session.project,
            highlights.len(),
            if highlights.len() == 1 { "y" } else { "ies" },
            highlights.join("; ")
        ))
    }

    /// Mark every active session past `stale_after` as `Ended` with
    /// `end_reason = "stale_cleanup"`, and persist each change.
    async fn reap_stale(&self) -> Result<()> {
        let now = Utc::now();
        let reaped: Vec<Session> = {
            let mut active = self.active.write();
            let mut reaped = Vec::new();
            for session in active.values_mut() {
                if is_stale(session, now, self.config.stale_after) {
                    session.status = SessionStatus::Ended;
                    session.ended_at = Some(now);
                    session.end_reason = Some("stale_cleanup".to_string());
                    reaped.push(session.clone());
                }
            }
            reaped
        };
        for session in &reaped {
            let collection = collection_name(&session.project, SUFFIX_SESSIONS);
            self.persist(&collection, session).await?;
        }
        Ok(())
    }

    fn find_resumable(&self, project: &str) -> Option<Session> {
        let now = Utc::now();
        self.active
            .read()
            .values()
            .filter(|s| s.project == project)
            .filter(|s| is_resumable(s, now, self.config.resume_window))
            .max_by_key(|s| s.last_activity_at)
            .cloned()
    }

    /// Record a touched file and/or issued query against `session_id`,
    /// evicting the oldest entry once the bound is exceeded.
    #[instrument(skip(self))]
    pub async fn add_activity(
        &self,
        session_id: Uuid,
        file: Option<String>,
        query: Option<String>,
    ) -> Result<()> {
        let collection;
        let updated = {
            let mut active = self.active.write();
            let Some(session) = active.get_mut(&session_id) else {
                return Ok(());
            };
            if let Some(file) = file {
                session.push_file(file, self.config.max_current_files);
            }
            if let Some(query) = query {
                session.push_query(query, self.config.max_recent_queries);
            }
            session.last_activity_at = Utc::now();
            collection = collection_name(&session.project, SUFFIX_SESSIONS);
            session.clone()
        };
        self.persist(&collection, &updated).await
    }

    /// End a session: record its durable learnings via governance, clear
    /// its in-memory entry, and persist the `Ended` status.
    #[instrument(skip(self, learnings))]
    pub async fn end_session(&self, session_id: Uuid, learnings: Vec<String>) -> Result<()> {
        let Some(mut session) = self.active.write().remove(&session_id) else {
            return Ok(());
        };
        session.status = SessionStatus::Ended;
        session.ended_at = Some(Utc::now());

        let collection = collection_name(&session.project, SUFFIX_SESSIONS);
        self.persist(&collection, &session).await?;

        for learning in learnings {
            self.ingest_auto_memory(&session, session_id, MemoryType::Insight, learning)
                .await?;
        }
        for decision in session.decisions.clone() {
            self.ingest_auto_memory(&session, session_id, MemoryType::Decision, decision)
                .await?;
        }

        Ok(())
    }

    async fn ingest_auto_memory(
        &self,
        session: &Session,
        session_id: Uuid,
        memory_type: MemoryType,
        content: String,
    ) -> Result<()> {
        let memory = Memory {
            id: Uuid::new_v4(),
            memory_type,
            content,
            tags: vec![],
            related_to: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            metadata: serde_json::json!({"sessionId": session_id}),
            status: None,
            status_history: vec![],
            source: MemorySource::AutoConversation,
            confidence: 0.6,
            validated: false,
        };
        self.governance.ingest(&session.project, memory).await?;
        Ok(())
    }

    async fn persist(&self, collection: &str, session: &Session) -> Result<()> {
        let point = UpsertPoint {
            id: session.id.to_string(),
            vector: vec![0.0_f32; self.vector_size],
            payload: session.payload().to_value(),
        };
        self.store.upsert(collection, vec![point]).await
    }
}
