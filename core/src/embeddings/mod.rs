//! Cached embedding access (§4.1), sitting between callers and the raw
//! [`EmbeddingProvider`] collaborator.

use crate::cache::Cache;
use crate::engine::EmbeddingProvider;
use crate::error::Result;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::instrument;

/// Wraps one [`EmbeddingProvider`] with the multi-level [`Cache`]. Every
/// public method checks the cache before calling the provider and writes
/// the result back on a miss.
///
/// Caching policy (§4.3): when `session` is present, embeddings go through
/// the full session/project/global cache; otherwise they fall back to the
/// flat, unscoped single-level cache.
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<Cache>,
}

impl Embedder {
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache: Arc<Cache>) -> Self {
        Self { provider, cache }
    }

    /// Embed one text for `project`, going through the multi-level cache
    /// when `session` is given and the single-level fallback otherwise.
    #[instrument(skip(self, text))]
    pub async fn embed(&self, project: &str, session: Option<&str>, text: &str) -> Result<Vec<f32>> {
        let model = self.provider.model_name();
        let cached = match session {
            Some(session) => self.cache.get_session_embedding(session, project, text, model).await?,
            None => self.cache.get_single_embedding(text, model).await?,
        };
        if let Some(cached) = cached {
            return Ok(cached);
        }
        let vector = self.provider.embed_text(text).await?;
        match session {
            Some(session) => {
                self.cache
                    .set_session_embedding(session, project, text, model, &vector)
                    .await?;
            }
            None => self.cache.set_single_embedding(text, model, &vector).await?,
        }
        Ok(vector)
    }

    /// Embed a batch of texts, checking the cache per-text first so a
    /// partial hit set only sends the misses to the provider. If the
    /// provider's batch call fails outright, falls back to embedding each
    /// miss individually so one bad text doesn't sink the whole batch.
    #[instrument(skip(self, texts))]
    pub async fn embed_batch(
        &self,
        project: &str,
        session: Option<&str>,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        let model = self.provider.model_name().to_string();
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let cached = match session {
                Some(session) => {
                    self.cache.get_session_embedding(session, project, text, &model).await?
                }
                None => self.cache.get_single_embedding(text, &model).await?,
            };
            match cached {
                Some(vector) => results.push(Some(vector)),
                None => {
                    results.push(None);
                    misses.push((i, text.clone()));
                }
            }
        }

        if !misses.is_empty() {
            let miss_texts: Vec<String> = misses.iter().map(|(_, t)| t.clone()).collect();
            let embedded = match self.provider.embed_batch(&miss_texts).await {
                Ok(vectors) => vectors,
                Err(_) => {
                    try_join_all(miss_texts.iter().map(|text| self.provider.embed_text(text)))
                        .await?
                }
            };

            for ((index, text), vector) in misses.into_iter().zip(embedded.into_iter()) {
                match session {
                    Some(session) => {
                        self.cache
                            .set_session_embedding(session, project, &text, &model, &vector)
                            .await?;
                    }
                    None => self.cache.set_single_embedding(&text, &model, &vector).await?,
                }
                results[index] = Some(vector);
            }
        }

        Ok(results.into_iter().map(|v| v.unwrap_or_default()).collect())
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheTtls;
    use crate::test_support::{FixedEmbeddingProvider, InMemoryKvEngine};

    fn embedder() -> Embedder {
        let cache = Arc::new(Cache::new(Arc::new(InMemoryKvEngine::new()), CacheTtls::default()));
        Embedder::new(Arc::new(FixedEmbeddingProvider::new(4)), cache)
    }

    #[tokio::test]
    async fn embed_caches_result_for_second_call() {
        let embedder = embedder();
        let first = embedder.embed("acme", None, "hello").await.unwrap();
        let second = embedder.embed("acme", None, "hello").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[tokio::test]
    async fn embed_batch_resolves_mixed_hits_and_misses() {
        let embedder = embedder();
        embedder.embed("acme", None, "cached").await.unwrap();

        let batch = embedder
            .embed_batch("acme", None, &["cached".to_string(), "fresh".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].len(), 4);
        assert_eq!(batch[1].len(), 4);
    }

    #[tokio::test]
    async fn session_present_writes_land_in_all_three_namespaces() {
        let embedder = embedder();
        let vector = embedder.embed("acme", Some("sess-1"), "hello").await.unwrap();

        let via_session = embedder.cache.get_session_embedding("sess-1", "acme", "hello", "fixed-test-embedding").await.unwrap();
        let via_project = embedder.cache.get_session_embedding("nobody", "acme", "hello", "fixed-test-embedding").await.unwrap();
        let via_global = embedder.cache.get_session_embedding("nobody", "no-such-project", "hello", "fixed-test-embedding").await.unwrap();

        assert_eq!(via_session, Some(vector.clone()));
        assert_eq!(via_project, Some(vector.clone()));
        assert_eq!(via_global, Some(vector));
    }
}
