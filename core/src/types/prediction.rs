//! Predictive prefetcher output types (§4.7).

use serde::{Deserialize, Serialize};

/// Strategy that produced a [`Prediction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStrategy {
    FileSimilarity,
    QueryPattern,
    ToolChain,
    FeatureContext,
}

/// What kind of artifact a prediction names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    File,
    Query,
    Tool,
}

/// A single prefetch candidate with the strategy that raised it and a
/// confidence in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction_type: PredictionType,
    pub target: String,
    pub confidence: f32,
    pub strategy: PredictionStrategy,
}

impl Prediction {
    #[must_use]
    pub fn new(
        prediction_type: PredictionType,
        target: impl Into<String>,
        confidence: f32,
        strategy: PredictionStrategy,
    ) -> Self {
        Self {
            prediction_type,
            target: target.into(),
            confidence,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_prediction() {
        let prediction = Prediction::new(
            PredictionType::File,
            "src/lib.rs",
            0.75,
            PredictionStrategy::FileSimilarity,
        );
        assert_eq!(prediction.target, "src/lib.rs");
        assert_eq!(prediction.strategy, PredictionStrategy::FileSimilarity);
    }
}
