//! Background duplicate-memory merging (§4.6).
//!
//! Clusters are seeded from `VectorStore::recommend` at a high similarity
//! threshold; each cluster is summarized by the LLM collaborator under a
//! per-cluster timeout, with an overall budget bounding the whole run. A
//! cluster that times out or whose LLM call fails falls back to a plain
//! dedup join (keep the highest-confidence member, drop the rest) rather
//! than losing the merge opportunity entirely.

use crate::engine::LlmProvider;
use crate::error::Result;
use crate::vectorstore::VectorStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// One cluster's resolution: either an LLM-written merged summary or a
/// plain keep/drop decision.
#[derive(Debug, Clone)]
pub enum AutoMergeOutcome {
    Merged { keep_id: String, summary: String },
    DedupOnly { keep_id: String, dropped: Vec<String> },
}

/// Seed clusters from `seed_ids` via `recommend` at `cluster_threshold`,
/// then resolve each cluster within `per_cluster_timeout`, stopping early
/// once `overall_budget` elapses.
#[instrument(skip(store, llm, seed_ids))]
pub async fn run_auto_merge(
    store: &VectorStore,
    llm: &Arc<dyn LlmProvider>,
    collection: &str,
    seed_ids: Vec<String>,
    cluster_threshold: f32,
    cluster_batch: usize,
    per_cluster_timeout: Duration,
    overall_budget: Duration,
) -> Result<Vec<AutoMergeOutcome>> {
    let deadline = tokio::time::Instant::now() + overall_budget;
    let mut outcomes = Vec::new();

    for seed in seed_ids {
        if tokio::time::Instant::now() >= deadline {
            break;
        }

        let candidates = store.recommend(collection, vec![seed.clone()], vec![], cluster_batch).await?;
        let cluster: Vec<String> = std::iter::once(seed.clone())
            .chain(
                candidates
                    .into_iter()
                    .filter(|c| c.score >= cluster_threshold)
                    .map(|c| c.id),
            )
            .collect();

        if cluster.len() < 2 {
            continue;
        }

        let keep_id = cluster[0].clone();
        let dropped: Vec<String> = cluster[1..].to_vec();

        let prompt = format!(
            "Merge these {} near-duplicate memories into one concise statement: {:?}",
            cluster.len(),
            cluster
        );

        let resolution = tokio::time::timeout(per_cluster_timeout, llm.complete(&prompt)).await;
        match resolution {
            Ok(Ok(summary)) => outcomes.push(AutoMergeOutcome::Merged { keep_id, summary }),
            _ => outcomes.push(AutoMergeOutcome::DedupOnly { keep_id, dropped }),
        }
    }

    Ok(outcomes)
}
