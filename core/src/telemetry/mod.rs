//! Lock-free counters for hot paths that must not contend on a mutex
//! under concurrent access (§5 Concurrency).

mod counter;

pub use counter::{Counter, Gauge};

use std::sync::Arc;

/// Process-wide counters for the operations called out in §5: cache
/// hits/misses, searches served, and memories ingested/promoted.
#[derive(Clone)]
pub struct Telemetry {
    pub cache_hits: Arc<Counter>,
    pub cache_misses: Arc<Counter>,
    pub searches_served: Arc<Counter>,
    pub memories_ingested: Arc<Counter>,
    pub memories_promoted: Arc<Counter>,
    pub active_sessions: Arc<Gauge>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            cache_hits: Arc::new(Counter::new()),
            cache_misses: Arc::new(Counter::new()),
            searches_served: Arc::new(Counter::new()),
            memories_ingested: Arc::new(Counter::new()),
            memories_promoted: Arc::new(Counter::new()),
            active_sessions: Arc::new(Gauge::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_telemetry_starts_at_zero() {
        let telemetry = Telemetry::default();
        assert_eq!(telemetry.cache_hits.get(), 0);
        assert_eq!(telemetry.active_sessions.get(), 0);
    }
}
