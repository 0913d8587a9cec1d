//! Aggregated query/tool usage patterns surfaced by `UsagePatterns::top_patterns` (§4.7A).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recurring `(tool, context)` combination with a running success rate.
///
/// `success_rate` is updated online via
/// `successRate' = successRate + (wasHelpful − successRate) / (usageCount + 1)`
/// rather than recomputed from stored history, so a pattern never needs to
/// replay its full usage log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPattern {
    pub tool_name: String,
    pub context_signature: String,
    pub usage_count: u64,
    pub success_rate: f64,
    pub last_used_at: DateTime<Utc>,
}

impl QueryPattern {
    #[must_use]
    pub fn new(tool_name: impl Into<String>, context_signature: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            context_signature: context_signature.into(),
            usage_count: 0,
            success_rate: 0.0,
            last_used_at: Utc::now(),
        }
    }

    /// Fold one new observation into the running success rate and bump the
    /// usage count. `observed_at` is the caller-supplied timestamp so the
    /// update stays deterministic and testable.
    pub fn record(&mut self, was_helpful: bool, observed_at: DateTime<Utc>) {
        let helpful = f64::from(u8::from(was_helpful));
        self.success_rate += (helpful - self.success_rate) / (self.usage_count as f64 + 1.0);
        self.usage_count += 1;
        self.last_used_at = observed_at;
    }

    /// Patterns below this usage count are too thin to be statistically
    /// meaningful and are excluded from `top_patterns`.
    pub const MIN_USAGE_FOR_RANKING: u64 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_running_mean() {
        let mut pattern = QueryPattern::new("search_code", "rust:lib.rs");
        let now = Utc::now();
        pattern.record(true, now);
        assert_eq!(pattern.usage_count, 1);
        assert!((pattern.success_rate - 1.0).abs() < 1e-9);

        pattern.record(false, now);
        assert_eq!(pattern.usage_count, 2);
        assert!((pattern.success_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn min_usage_for_ranking_is_three() {
        assert_eq!(QueryPattern::MIN_USAGE_FOR_RANKING, 3);
    }
}
