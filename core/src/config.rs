//! Crate configuration.
//!
//! Follows the teacher's `MemoryConfig`/`StorageConfig` pattern: a plain
//! struct with a `Default` impl for tests and a `from_env()` constructor
//! that reads documented environment variables with sane fallbacks.

use std::time::Duration;

/// TTL buckets for the multi-level cache (§4.2).
#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub session_embedding: Duration,
    pub session_search: Duration,
    pub project_embedding: Duration,
    pub project_search: Duration,
    pub collection_info: Duration,
    pub global_embedding: Duration,
    pub single_level_embedding: Duration,
    pub session_context: Duration,
    pub cache_stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            session_embedding: Duration::from_secs(30 * 60),
            session_search: Duration::from_secs(3 * 60),
            project_embedding: Duration::from_secs(60 * 60),
            project_search: Duration::from_secs(5 * 60),
            collection_info: Duration::from_secs(30),
            global_embedding: Duration::from_secs(24 * 60 * 60),
            single_level_embedding: Duration::from_secs(60 * 60),
            session_context: Duration::from_secs(60 * 60),
            cache_stats: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Tunables for `MemoryGovernance`'s adaptive confidence threshold (§4.5).
#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    pub cold_start_default: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub cold_start_floor: u64,
    pub cache_ttl: Duration,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cold_start_default: 0.5,
            min_threshold: 0.4,
            max_threshold: 0.8,
            cold_start_floor: 5,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

/// Session lifecycle windows (§4.6).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub stale_after: Duration,
    pub resume_window: Duration,
    pub max_current_files: usize,
    pub max_recent_queries: usize,
    pub auto_merge_interval: Duration,
    pub auto_merge_cluster_threshold: f32,
    pub auto_merge_cluster_batch: usize,
    pub auto_merge_per_cluster_timeout: Duration,
    pub auto_merge_overall_budget: Duration,
    /// Hard wall-clock deadline for the session briefing's durable-memory
    /// recall; on expiry the briefing is dropped rather than blocking
    /// `startSession` (§5).
    pub enrichment_deadline: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(2 * 60 * 60),
            resume_window: Duration::from_secs(24 * 60 * 60),
            max_current_files: 20,
            max_recent_queries: 50,
            auto_merge_interval: Duration::from_secs(60 * 60),
            auto_merge_cluster_threshold: 0.9,
            auto_merge_cluster_batch: 3,
            auto_merge_per_cluster_timeout: Duration::from_secs(30),
            auto_merge_overall_budget: Duration::from_secs(90),
            enrichment_deadline: Duration::from_secs(2),
        }
    }
}

/// Predictive prefetcher tunables (§4.7).
#[derive(Debug, Clone)]
pub struct PredictiveConfig {
    pub rate_limit_window: Duration,
    pub prefetch_concurrency: usize,
    pub min_confidence: f32,
    pub max_predictions: usize,
}

impl Default for PredictiveConfig {
    fn default() -> Self {
        Self {
            rate_limit_window: Duration::from_secs(30),
            prefetch_concurrency: 5,
            min_confidence: 0.6,
            max_predictions: 10,
        }
    }
}

/// Indexer batching tunables (§4.4).
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub file_batch_size: usize,
    pub embedding_batch_size: usize,
    pub max_chunk_chars: usize,
    pub min_chunk_non_whitespace_chars: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            file_batch_size: 20,
            embedding_batch_size: 100,
            max_chunk_chars: 1000,
            min_chunk_non_whitespace_chars: 10,
        }
    }
}

/// Top-level crate configuration, normally loaded once at startup.
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub vector_size: usize,
    pub log_level: String,
    pub upsert_batch_size: usize,
    pub rrf_k: u32,
    pub cache_ttls: CacheTtls,
    pub threshold: ThresholdConfig,
    pub session: SessionConfig,
    pub predictive: PredictiveConfig,
    pub indexer: IndexerConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            vector_size: 1024,
            log_level: "info".to_string(),
            upsert_batch_size: 100,
            rrf_k: 60,
            cache_ttls: CacheTtls::default(),
            threshold: ThresholdConfig::default(),
            session: SessionConfig::default(),
            predictive: PredictiveConfig::default(),
            indexer: IndexerConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable. Absence of a connection
    /// URL is never an error here — collaborators are constructed and
    /// injected by the embedding application, not by this crate.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("VECTOR_SIZE") {
            if let Ok(size) = raw.parse::<usize>() {
                config.vector_size = size;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_ttls() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.session_embedding, Duration::from_secs(1800));
        assert_eq!(ttls.session_search, Duration::from_secs(180));
        assert_eq!(ttls.project_embedding, Duration::from_secs(3600));
        assert_eq!(ttls.project_search, Duration::from_secs(300));
        assert_eq!(ttls.collection_info, Duration::from_secs(30));
        assert_eq!(ttls.global_embedding, Duration::from_secs(86_400));
    }

    #[test]
    fn threshold_defaults_match_spec() {
        let t = ThresholdConfig::default();
        assert_eq!(t.cold_start_default, 0.5);
        assert_eq!(t.min_threshold, 0.4);
        assert_eq!(t.max_threshold, 0.8);
        assert_eq!(t.cold_start_floor, 5);
    }

    #[test]
    fn from_env_overrides_vector_size() {
        unsafe {
            std::env::set_var("VECTOR_SIZE", "768");
        }
        let config = RagConfig::from_env();
        assert_eq!(config.vector_size, 768);
        unsafe {
            std::env::remove_var("VECTOR_SIZE");
        }
    }
}
