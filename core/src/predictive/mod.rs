//! Predictive prefetching: combine per-strategy candidates, filter and
//! rank them, then prefetch under a rate limit and bounded concurrency
//! (§4.7).

mod strategies;

pub use strategies::{feature_context, file_similarity, query_pattern, tool_chain};

use crate::config::PredictiveConfig;
use crate::telemetry::Counter;
use crate::types::{Prediction, PredictionStrategy};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::instrument;
use uuid::Uuid;

const STRATEGIES: [PredictionStrategy; 4] = [
    PredictionStrategy::FileSimilarity,
    PredictionStrategy::QueryPattern,
    PredictionStrategy::ToolChain,
    PredictionStrategy::FeatureContext,
];

/// Merge predictions from every strategy into one ranked, deduplicated,
/// length-bounded list: confidence below `min_confidence` is dropped,
/// duplicate targets keep only their highest-confidence occurrence, and the
/// result is sorted descending and truncated to `max_predictions`.
#[must_use]
pub fn rank_predictions(config: &PredictiveConfig, candidates: Vec<Prediction>) -> Vec<Prediction> {
    let mut by_target: HashMap<String, Prediction> = HashMap::new();
    for prediction in candidates {
        if prediction.confidence < config.min_confidence {
            continue;
        }
        by_target
            .entry(prediction.target.clone())
            .and_modify(|existing| {
                if prediction.confidence > existing.confidence {
                    *existing = prediction.clone();
                }
            })
            .or_insert(prediction);
    }

    let mut ranked: Vec<Prediction> = by_target.into_values().collect();
    ranked.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(config.max_predictions);
    ranked
}

/// Rate-limits and bounds the concurrency of background prefetch work per
/// session: at most one prefetch pass per `rate_limit_window`, and at most
/// `prefetch_concurrency` prefetch tasks in flight at once across all
/// sessions.
pub struct PredictiveLoader {
    config: PredictiveConfig,
    last_run: Mutex<HashMap<Uuid, Instant>>,
    semaphore: Arc<Semaphore>,
    strategy_counts: HashMap<PredictionStrategy, Arc<Counter>>,
}

impl PredictiveLoader {
    #[must_use]
    pub fn new(config: PredictiveConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.prefetch_concurrency));
        let strategy_counts = STRATEGIES
            .into_iter()
            .map(|strategy| (strategy, Arc::new(Counter::new())))
            .collect();
        Self {
            config,
            last_run: Mutex::new(HashMap::new()),
            semaphore,
            strategy_counts,
        }
    }

    /// Record that `ranked` survived post-processing, incrementing each
    /// surfaced prediction's per-strategy counter for hit-rate analytics.
    pub fn record_surfaced(&self, ranked: &[Prediction]) {
        for prediction in ranked {
            if let Some(counter) = self.strategy_counts.get(&prediction.strategy) {
                counter.increment();
            }
        }
    }

    /// Cumulative count of surfaced predictions per strategy.
    #[must_use]
    pub fn strategy_counts(&self) -> HashMap<PredictionStrategy, u64> {
        self.strategy_counts
            .iter()
            .map(|(strategy, counter)| (*strategy, counter.get()))
            .collect()
    }

    /// `true` if a prefetch pass for `session_id` is allowed right now,
    /// i.e. the session hasn't prefetched within `rate_limit_window`.
    /// Recording a pass as allowed updates the session's last-run time.
    #[instrument(skip(self))]
    pub fn try_acquire(&self, session_id: Uuid) -> bool {
        let mut last_run = self.last_run.lock();
        let now = Instant::now();
        let allowed = last_run
            .get(&session_id)
            .is_none_or(|last| now.duration_since(*last) >= self.config.rate_limit_window);
        if allowed {
            last_run.insert(session_id, now);
        }
        allowed
    }

    /// Bound overall prefetch concurrency; callers hold the returned
    /// permit for the duration of one prefetch task.
    pub async fn acquire_slot(&self) -> tokio::sync::OwnedSemaphorePermit {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("prefetch semaphore is never closed")
    }
}
