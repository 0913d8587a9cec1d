//! Tool-usage and search-feedback aggregation, and conversation-derived
//! fact extraction (§4.7A).

mod extractor;

pub use extractor::FactExtractor;

use crate::types::QueryPattern;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::instrument;

/// Tracks recurring `(tool, context)` patterns with an online running
/// success rate, keyed by `"{tool_name}:{context_signature}"`.
#[derive(Default)]
pub struct UsagePatterns {
    patterns: RwLock<HashMap<String, QueryPattern>>,
}

impl UsagePatterns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tool call against its context signature, creating the
    /// pattern on first observation.
    #[instrument(skip(self))]
    pub fn record_tool_usage(&self, tool_name: &str, context_signature: &str, observed_at: DateTime<Utc>) {
        let key = format!("{tool_name}:{context_signature}");
        let mut patterns = self.patterns.write();
        let pattern = patterns
            .entry(key)
            .or_insert_with(|| QueryPattern::new(tool_name, context_signature));
        pattern.last_used_at = observed_at;
    }

    /// Record whether a prior search/tool call was helpful, folding it into
    /// the pattern's running success rate.
    #[instrument(skip(self))]
    pub fn record_search_feedback(
        &self,
        tool_name: &str,
        context_signature: &str,
        was_helpful: bool,
        observed_at: DateTime<Utc>,
    ) {
        let key = format!("{tool_name}:{context_signature}");
        let mut patterns = self.patterns.write();
        let pattern = patterns
            .entry(key)
            .or_insert_with(|| QueryPattern::new(tool_name, context_signature));
        pattern.record(was_helpful, observed_at);
    }

    /// Patterns with at least [`QueryPattern::MIN_USAGE_FOR_RANKING`]
    /// observations, ranked by success rate descending and truncated to
    /// `limit`.
    #[must_use]
    pub fn top_patterns(&self, limit: usize) -> Vec<QueryPattern> {
        let mut ranked: Vec<QueryPattern> = self
            .patterns
            .read()
            .values()
            .filter(|p| p.usage_count >= QueryPattern::MIN_USAGE_FOR_RANKING)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| b.success_rate.partial_cmp(&a.success_rate).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }
}
