use crate::types::{Prediction, PredictionStrategy, PredictionType, QueryPattern, Session};

/// Predict files likely to be touched next because they co-occur with
/// files already in the session's working set, approximated here by
/// weighting files that share a directory prefix with a current file.
#[must_use]
pub fn file_similarity(session: &Session, candidate_files: &[String]) -> Vec<Prediction> {
    let current_dirs: Vec<&str> = session
        .current_files
        .iter()
        .filter_map(|f| f.rsplit_once('/').map(|(dir, _)| dir))
        .collect();

    candidate_files
        .iter()
        .filter(|f| !session.current_files.contains(f))
        .filter_map(|f| {
            let dir = f.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
            if current_dirs.contains(&dir) {
                Some(Prediction::new(
                    PredictionType::File,
                    f.clone(),
                    0.7,
                    PredictionStrategy::FileSimilarity,
                ))
            } else {
                None
            }
        })
        .collect()
}

/// Predict queries likely to recur, drawn from patterns with enough usage
/// history to be trustworthy and weighted by their running success rate.
#[must_use]
pub fn query_pattern(patterns: &[QueryPattern]) -> Vec<Prediction> {
    patterns
        .iter()
        .filter(|p| p.usage_count >= QueryPattern::MIN_USAGE_FOR_RANKING)
        .map(|p| {
            Prediction::new(
                PredictionType::Query,
                p.context_signature.clone(),
                p.success_rate as f32,
                PredictionStrategy::QueryPattern,
            )
        })
        .collect()
}

/// Predict the next tool in a commonly-observed chain, given the most
/// recently used tool and a table of observed `(from, to)` transition
/// counts.
#[must_use]
pub fn tool_chain(last_tool: &str, transitions: &[((String, String), u64)]) -> Vec<Prediction> {
    let total: u64 = transitions
        .iter()
        .filter(|((from, _), _)| from == last_tool)
        .map(|(_, count)| count)
        .sum();
    if total == 0 {
        return Vec::new();
    }

    transitions
        .iter()
        .filter(|((from, _), _)| from == last_tool)
        .map(|((_, to), count)| {
            let confidence = *count as f32 / total as f32;
            Prediction::new(PredictionType::Tool, to.clone(), confidence, PredictionStrategy::ToolChain)
        })
        .collect()
}

/// Predict memories relevant to the session's current feature context,
/// derived from tags shared with the session's recent queries.
#[must_use]
pub fn feature_context(recent_queries: &[String], memory_tags: &[(String, Vec<String>)]) -> Vec<Prediction> {
    memory_tags
        .iter()
        .filter(|(_, tags)| {
            tags.iter()
                .any(|tag| recent_queries.iter().any(|q| q.contains(tag.as_str())))
        })
        .map(|(id, _)| {
            Prediction::new(PredictionType::Query, id.clone(), 0.65, PredictionStrategy::FeatureContext)
        })
        .collect()
}
