use crate::error::Result;
use async_trait::async_trait;

/// External chat-completion model used for auto-merge summarization,
/// conversation-derived memory extraction, and session briefings.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete `prompt`, returning the raw response text. Callers that
    /// expect JSON route the result through
    /// [`crate::error::LlmJsonResult::parse`] rather than assuming
    /// well-formed output.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, recorded alongside generated memories for
    /// provenance.
    fn model_name(&self) -> &str;
}
