//! Embedding provider trait, adapted from the teacher's
//! `embeddings::provider::EmbeddingProvider` to this crate's error taxonomy.

use crate::error::Result;
use async_trait::async_trait;

/// External text-to-vector model. `Embedder` wraps this with the
/// multi-level cache; implementations should not cache internally.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text, returning a dense vector of
    /// [`EmbeddingProvider::dimension`] length.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts in one round trip where the provider
    /// supports it. Default implementation calls `embed_text` per item, so
    /// implementations that can't batch natively need not override this.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed_text(text).await?);
        }
        Ok(out)
    }

    /// Dimension of vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Model identifier, recorded for cache-key namespacing.
    fn model_name(&self) -> &str;
}
