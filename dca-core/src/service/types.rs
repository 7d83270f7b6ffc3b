use dca_common::DcaPlan;
use serde::Serialize;

use crate::simulation::Comparison;

/// Result of running one plan against several symbols
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub plan: DcaPlan,
    /// Provider the prices came from
    pub source: &'static str,
    #[serde(flatten)]
    pub comparison: Comparison,
}
