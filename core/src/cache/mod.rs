//! Multi-level cache over the injected [`KvEngine`] (§4.2).
//!
//! Three namespaces — session (L1), project (L2), global (L3) — each with
//! its own TTL. Embedding lookups check L1 → L2 → L3 in order and, on an L2
//! or L3 hit, re-write the value at every shallower level so the next
//! lookup for the same text is an L1 hit ("promotion").

mod key;

pub use key::CacheKey;

use crate::config::CacheTtls;
use crate::engine::KvEngine;
use crate::error::Result;
use crate::types::CacheStats;
use futures::try_join;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Cache namespace, narrowest to broadest scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Session,
    Project,
    Global,
}

impl Level {
    fn prefix(self) -> &'static str {
        match self {
            Level::Session => "l1:sess",
            Level::Project => "l2:proj",
            Level::Global => "l3:glob",
        }
    }
}

/// Namespaced, TTL-aware cache wrapping one [`KvEngine`].
pub struct Cache {
    engine: Arc<dyn KvEngine>,
    ttls: CacheTtls,
    stats: Mutex<CacheStats>,
}

impl Cache {
    #[must_use]
    pub fn new(engine: Arc<dyn KvEngine>, ttls: CacheTtls) -> Self {
        Self {
            engine,
            ttls,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    /// Multi-level embedding read (`getSessionEmbedding`, §4.2): try L1
    /// (`session_scope`), then L2 (`project_scope`), then L3 (unscoped
    /// global), write-through to every shallower level on a deeper hit.
    #[instrument(skip(self, text))]
    pub async fn get_session_embedding(
        &self,
        session_scope: &str,
        project_scope: &str,
        text: &str,
        model: &str,
    ) -> Result<Option<Vec<f32>>> {
        let scoped_levels = [
            (Level::Session, session_scope),
            (Level::Project, project_scope),
            (Level::Global, ""),
        ];
        for (i, (level, scope)) in scoped_levels.iter().enumerate() {
            let key = CacheKey::embedding(*level, scope, text, model);
            if let Some(bytes) = self.engine.get(&key.to_string()).await? {
                let vector: Vec<f32> = serde_json::from_slice(&bytes)
                    .map_err(|e| crate::error::Error::Serialization(e.to_string()))?;
                self.stats.lock().record_hit();
                if i > 0 {
                    self.stats.lock().record_promotion();
                    for (shallower_level, shallower_scope) in &scoped_levels[..i] {
                        let shallow_key =
                            CacheKey::embedding(*shallower_level, shallower_scope, text, model);
                        let ttl = self.ttl_for(*shallower_level, CacheKind::Embedding);
                        let _ = self
                            .engine
                            .set(&shallow_key.to_string(), bytes.clone(), ttl)
                            .await;
                    }
                }
                return Ok(Some(vector));
            }
        }
        self.stats.lock().record_miss();
        Ok(None)
    }

    /// Multi-level embedding write (`setSessionEmbedding`, §4.2): write to
    /// session, project, and global namespaces concurrently, each at its
    /// own TTL. Idempotent — last write wins within a TTL window.
    #[instrument(skip(self, text, vector))]
    pub async fn set_session_embedding(
        &self,
        session_scope: &str,
        project_scope: &str,
        text: &str,
        model: &str,
        vector: &[f32],
    ) -> Result<()> {
        let bytes = serde_json::to_vec(vector)
            .map_err(|e| crate::error::Error::Serialization(e.to_string()))?;
        let session_key = CacheKey::embedding(Level::Session, session_scope, text, model);
        let project_key = CacheKey::embedding(Level::Project, project_scope, text, model);
        let global_key = CacheKey::embedding(Level::Global, "", text, model);
        let session_key_str = session_key.to_string();
        let project_key_str = project_key.to_string();
        let global_key_str = global_key.to_string();
        try_join!(
            self.engine
                .set(&session_key_str, bytes.clone(), self.ttls.session_embedding),
            self.engine
                .set(&project_key_str, bytes.clone(), self.ttls.project_embedding),
            self.engine
                .set(&global_key_str, bytes, self.ttls.global_embedding),
        )?;
        Ok(())
    }

    /// Single-level embedding read used when no session/project context is
    /// available (§4.3 fallback): a flat `emb:<hash>` key, unscoped.
    #[instrument(skip(self, text))]
    pub async fn get_single_embedding(&self, text: &str, model: &str) -> Result<Option<Vec<f32>>> {
        let key = CacheKey::single_embedding(text, model);
        match self.engine.get(&key.to_string()).await? {
            Some(bytes) => {
                let vector: Vec<f32> = serde_json::from_slice(&bytes)
                    .map_err(|e| crate::error::Error::Serialization(e.to_string()))?;
                self.stats.lock().record_hit();
                Ok(Some(vector))
            }
            None => {
                self.stats.lock().record_miss();
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, text, vector))]
    pub async fn set_single_embedding(&self, text: &str, model: &str, vector: &[f32]) -> Result<()> {
        let key = CacheKey::single_embedding(text, model);
        let bytes = serde_json::to_vec(vector)
            .map_err(|e| crate::error::Error::Serialization(e.to_string()))?;
        self.engine
            .set(&key.to_string(), bytes, self.ttls.single_level_embedding)
            .await
    }

    #[instrument(skip(self, query))]
    pub async fn get_search(
        &self,
        level: Level,
        scope: &str,
        query: &str,
    ) -> Result<Option<Vec<u8>>> {
        let key = CacheKey::search(level, scope, query);
        let hit = self.engine.get(&key.to_string()).await?;
        if hit.is_some() {
            self.stats.lock().record_hit();
        } else {
            self.stats.lock().record_miss();
        }
        Ok(hit)
    }

    #[instrument(skip(self, query, results))]
    pub async fn set_search(
        &self,
        level: Level,
        scope: &str,
        query: &str,
        results: Vec<u8>,
    ) -> Result<()> {
        let key = CacheKey::search(level, scope, query);
        let ttl = self.ttl_for(level, CacheKind::Search);
        self.engine.set(&key.to_string(), results, ttl).await
    }

    /// Clear every session-scoped key for `session_id`, called at session
    /// end.
    #[instrument(skip(self))]
    pub async fn clear_session(&self, session_id: &str) -> Result<u64> {
        self.engine
            .delete_matching(&format!("{}:{session_id}", Level::Session.prefix()))
            .await
    }

    /// Look up cached `ensureCollection`/`scroll` metadata for `collection`.
    #[instrument(skip(self))]
    pub async fn get_collection_info(&self, collection: &str) -> Result<Option<Vec<u8>>> {
        let key = CacheKey::collection_info(collection);
        self.engine.get(&key.to_string()).await
    }

    #[instrument(skip(self, info))]
    pub async fn set_collection_info(&self, collection: &str, info: Vec<u8>) -> Result<()> {
        let key = CacheKey::collection_info(collection);
        self.engine.set(&key.to_string(), info, self.ttls.collection_info).await
    }

    /// Best-effort warming of a new session's L1 embedding cache from
    /// `recent_queries` known to already be hot in a prior session: for each
    /// query (up to 20), lift whichever of L2/L3 already has it into the new
    /// session's L1. A query with no warm entry anywhere is skipped rather
    /// than calling the embedding provider — warming never calls out.
    #[instrument(skip(self, recent_queries))]
    pub async fn warm_session(
        &self,
        project_scope: &str,
        new_session_scope: &str,
        model: &str,
        recent_queries: &[String],
    ) {
        for query in recent_queries.iter().take(20) {
            for (level, scope) in [(Level::Project, project_scope), (Level::Global, "")] {
                let key = CacheKey::embedding(level, scope, query, model);
                let Ok(Some(bytes)) = self.engine.get(&key.to_string()).await else {
                    continue;
                };
                let dest = CacheKey::embedding(Level::Session, new_session_scope, query, model);
                let _ = self
                    .engine
                    .set(&dest.to_string(), bytes, self.ttls.session_embedding)
                    .await;
                break;
            }
        }
    }

    fn ttl_for(&self, level: Level, kind: CacheKind) -> Duration {
        match (level, kind) {
            (Level::Session, CacheKind::Embedding) => self.ttls.session_embedding,
            (Level::Session, CacheKind::Search) => self.ttls.session_search,
            (Level::Project, CacheKind::Embedding) => self.ttls.project_embedding,
            (Level::Project, CacheKind::Search) => self.ttls.project_search,
            (Level::Global, CacheKind::Embedding) => self.ttls.global_embedding,
            (Level::Global, CacheKind::Search) => self.ttls.project_search,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CacheKind {
    Embedding,
    Search,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryKvEngine;

    fn cache() -> Cache {
        Cache::new(Arc::new(InMemoryKvEngine::new()), CacheTtls::default())
    }

    #[tokio::test]
    async fn session_embedding_miss_then_multi_level_hit() {
        let cache = cache();
        assert!(cache
            .get_session_embedding("sess-1", "acme", "fn main() {}", "m1")
            .await
            .unwrap()
            .is_none());

        cache
            .set_session_embedding("sess-1", "acme", "fn main() {}", "m1", &[0.1, 0.2])
            .await
            .unwrap();

        for scope in ["sess-1", "acme"] {
            let hit = cache
                .get_session_embedding(scope, scope, "fn main() {}", "m1")
                .await
                .unwrap();
            assert_eq!(hit, Some(vec![0.1, 0.2]));
        }
        let global_key = CacheKey::embedding(Level::Global, "", "fn main() {}", "m1");
        assert!(cache.engine.get(&global_key.to_string()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn global_hit_promotes_to_session_and_project() {
        let cache = cache();
        let global_key = CacheKey::embedding(Level::Global, "", "shared", "m1");
        cache
            .engine
            .set(
                &global_key.to_string(),
                serde_json::to_vec(&vec![0.5_f32]).unwrap(),
                cache.ttls.global_embedding,
            )
            .await
            .unwrap();

        cache
            .get_session_embedding("sess-1", "acme", "shared", "m1")
            .await
            .unwrap();

        let session_key = CacheKey::embedding(Level::Session, "sess-1", "shared", "m1");
        let project_key = CacheKey::embedding(Level::Project, "acme", "shared", "m1");
        assert!(cache.engine.get(&session_key.to_string()).await.unwrap().is_some());
        assert!(cache.engine.get(&project_key.to_string()).await.unwrap().is_some());
        assert_eq!(cache.stats().promotions, 1);
    }

    #[tokio::test]
    async fn single_embedding_round_trips_without_scope() {
        let cache = cache();
        assert!(cache
            .get_single_embedding("fn main() {}", "m1")
            .await
            .unwrap()
            .is_none());

        cache.set_single_embedding("fn main() {}", "m1", &[0.4]).await.unwrap();

        assert_eq!(
            cache.get_single_embedding("fn main() {}", "m1").await.unwrap(),
            Some(vec![0.4])
        );
    }

    #[tokio::test]
    async fn collection_info_round_trips() {
        let cache = cache();
        assert!(cache.get_collection_info("acme_codebase").await.unwrap().is_none());
        cache
            .set_collection_info("acme_codebase", b"info".to_vec())
            .await
            .unwrap();
        assert_eq!(
            cache.get_collection_info("acme_codebase").await.unwrap(),
            Some(b"info".to_vec())
        );
    }

    #[tokio::test]
    async fn warm_session_lifts_project_embedding_into_new_session_l1() {
        let cache = cache();
        cache
            .set_session_embedding("sess-old", "acme", "how do sessions resume", "m1", &[0.3])
            .await
            .unwrap();

        cache
            .warm_session("acme", "new-session", "m1", &["how do sessions resume".to_string()])
            .await;

        let key = CacheKey::embedding(Level::Session, "new-session", "how do sessions resume", "m1");
        let bytes = cache.engine.get(&key.to_string()).await.unwrap().unwrap();
        let hit: Vec<f32> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(hit, vec![0.3]);
    }
}
