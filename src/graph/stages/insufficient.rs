//! Insufficient-data stage: terminal branch for empty collection results

use async_trait::async_trait;
use tracing::warn;

use super::{Stage, StageResult};
use crate::graph::state::{StageName, StateUpdate, WorkflowState};

/// Records why planning cannot proceed and lets the run end
///
/// Reached only when every place category came back empty. The stage is
/// marked completed so the caller can distinguish "ran out of data" from
/// "crashed": its presence in the completed list is the signal.
pub struct InsufficientDataStage;

#[async_trait]
impl Stage for InsufficientDataStage {
    fn name(&self) -> StageName {
        StageName::InsufficientData
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let mut missing = Vec::new();
        if state.hotels.is_empty() {
            missing.push("hotels");
        }
        if state.restaurants.is_empty() {
            missing.push("restaurants");
        }
        if state.attractions.is_empty() {
            missing.push("attractions");
        }

        let message = format!(
            "no usable places collected for {} (missing: {})",
            state.request.destination,
            missing.join(", ")
        );
        warn!(destination = %state.request.destination, "insufficient_data: {message}");

        StageResult::advance(
            StateUpdate::entering(self.name())
                .noting(self.name(), message)
                .completed(self.name()),
        )
    }
}
