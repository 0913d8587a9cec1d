use crate::error::{GateDetail, Result};
use async_trait::async_trait;
use crate::types::Memory;

/// Outcome of running every configured gate against a promotion candidate.
#[derive(Debug, Clone)]
pub struct QualityGateReport {
    pub passed: bool,
    pub gates: Vec<GateDetail>,
}

/// External quality-gate runner consulted by `MemoryGovernance::promote`
/// before a quarantined memory is allowed into the durable collection.
#[async_trait]
pub trait QualityGateProvider: Send + Sync {
    /// Run every configured gate against `candidate`. A non-passing report
    /// carries the per-gate detail `MemoryGovernance` surfaces in
    /// [`crate::error::Error::QualityGatesFailed`].
    async fn evaluate(&self, candidate: &Memory) -> Result<QualityGateReport>;
}
