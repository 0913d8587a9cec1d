use crate::engine::ScoredPoint;
use serde_json::Value;
use std::collections::HashMap;

/// Fuse multiple ranked result lists with Reciprocal Rank Fusion:
/// `score(id) = sum over lists of 1 / (k + rank)`, rank starting at 1.
///
/// Used when the vector engine has no native combined dense+sparse search
/// and the two rankings must be merged client-side. `k = 60` is the
/// standard RRF constant.
#[must_use]
pub fn reciprocal_rank_fusion(
    lists: &[Vec<ScoredPoint>],
    k: u32,
    limit: usize,
) -> Vec<ScoredPoint> {
    let mut fused: HashMap<String, (f32, Value)> = HashMap::new();

    for list in lists {
        for (rank, point) in list.iter().enumerate() {
            let contribution = 1.0 / (f32::from(u16::try_from(rank).unwrap_or(u16::MAX)) + k as f32 + 1.0);
            let entry = fused
                .entry(point.id.clone())
                .or_insert((0.0, point.payload.clone()));
            entry.0 += contribution;
        }
    }

    let mut merged: Vec<ScoredPoint> = fused
        .into_iter()
        .map(|(id, (score, payload))| ScoredPoint { id, score, payload })
        .collect();
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str) -> ScoredPoint {
        ScoredPoint {
            id: id.into(),
            score: 0.0,
            payload: serde_json::json!({}),
        }
    }

    #[test]
    fn point_in_both_lists_outranks_single_list_point() {
        let dense = vec![point("a"), point("b")];
        let sparse = vec![point("a"), point("c")];
        let fused = reciprocal_rank_fusion(&[dense, sparse], 60, 10);
        assert_eq!(fused[0].id, "a");
        assert!(fused[1].id == "b" || fused[1].id == "c");
    }

    #[test]
    fn truncates_to_limit() {
        let dense = vec![point("a"), point("b"), point("c")];
        let fused = reciprocal_rank_fusion(&[dense], 60, 2);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn fuses_dense_and_sparse_lists_to_hand_computed_top_two() {
        let dense = vec![point("a"), point("b"), point("c")];
        let sparse = vec![point("c"), point("b"), point("d")];
        let fused = reciprocal_rank_fusion(&[dense, sparse], 60, 2);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].id, "c");
        assert_eq!(fused[1].id, "b");
    }
}
