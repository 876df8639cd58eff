//! Intake stage: request validation and run seeding

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Stage, StageResult};
use crate::graph::state::{StageName, StateUpdate, WorkflowState};

/// Validates the request and seeds the planning context
///
/// The only stage whose failure is fatal before any data exists: a request
/// that fails validation aborts the run with no further stages executed.
pub struct IntakeStage;

#[async_trait]
impl Stage for IntakeStage {
    fn name(&self) -> StageName {
        StageName::Intake
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let update = StateUpdate::entering(self.name());

        if let Err(e) = state.request.validate() {
            warn!(error = %e, "intake: request rejected");
            return StageResult::abort(update.failed(self.name(), e.to_string()));
        }

        info!(
            destination = %state.request.destination,
            duration = state.request.duration(),
            travelers = state.request.travelers,
            budget_level = state.request.budget_level(),
            "intake: request accepted"
        );

        StageResult::advance(update.completed(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TravelRequest;
    use crate::graph::stages::Outcome;

    async fn run_intake(request: TravelRequest) -> StageResult {
        let state = WorkflowState::new(request);
        IntakeStage.run(&state).await
    }

    #[tokio::test]
    async fn test_valid_request_continues() {
        let request = TravelRequest::new(
            "Paris, France",
            "2024-09-15".parse().unwrap(),
            "2024-09-19".parse().unwrap(),
        );
        let result = run_intake(request).await;

        assert_eq!(result.outcome, Outcome::Continue);
        assert!(result.update.completed_stages.contains(&StageName::Intake));
    }

    #[tokio::test]
    async fn test_invalid_request_fatal() {
        let request = TravelRequest::new(
            "Paris, France",
            "2024-09-19".parse().unwrap(),
            "2024-09-15".parse().unwrap(),
        );
        let result = run_intake(request).await;

        assert_eq!(result.outcome, Outcome::Fatal);
        assert!(result.update.failed_stages.contains(&StageName::Intake));
        assert_eq!(result.update.error_messages.len(), 1);
        assert!(result.update.error_messages[0].starts_with("intake:"));
    }
}
