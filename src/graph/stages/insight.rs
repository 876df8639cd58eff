//! Local-insight stage: LLM-assisted timing, transport, and cultural tips

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Stage, StageResult};
use crate::graph::state::{StageName, StateUpdate, WorkflowState};
use crate::llm::GenerateClient;

/// Derives insider knowledge for the destination
///
/// Same contract as Research: non-fatal, proceeds without the insight on
/// generation failure.
pub struct LocalInsightStage {
    llm: Arc<dyn GenerateClient>,
}

impl LocalInsightStage {
    pub fn new(llm: Arc<dyn GenerateClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(state: &WorkflowState) -> String {
        let top_names = |places: &[crate::domain::PlaceRecord]| {
            places.iter().take(3).map(|p| p.name.clone()).collect::<Vec<_>>().join(", ")
        };

        format!(
            "As a local expert for {}, share insider insights for travelers.\n\
             Top hotels found: {}.\nTop restaurants found: {}.\n\
             Cover the best times to visit popular attractions, local transportation \
             tips, authentic experiences tourists miss, and cultural do's and don'ts.",
            state.request.destination,
            top_names(&state.hotels),
            top_names(&state.restaurants),
        )
    }
}

#[async_trait]
impl Stage for LocalInsightStage {
    fn name(&self) -> StageName {
        StageName::LocalInsight
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let update = StateUpdate::entering(self.name());
        let prompt = Self::build_prompt(state);
        let context = serde_json::json!({
            "destination": state.request.destination,
            "duration": state.request.duration(),
        });

        match self.llm.generate(&prompt, &context).await {
            Ok(insight) => {
                info!(insight_len = insight.len(), "local_insight: generated");
                let mut update = update.completed(self.name());
                update.local_insight = Some(insight);
                StageResult::advance(update)
            }
            Err(e) => {
                warn!(error = %e, "local_insight: text generation failed");
                StageResult::advance(update.failed(self.name(), format!("text generation failed: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlaceRecord, TravelRequest};
    use crate::graph::stages::Outcome;
    use crate::graph::state::StateUpdate;
    use crate::llm::client::mock::MockGenerateClient;

    fn state_with_places() -> WorkflowState {
        let mut state = WorkflowState::new(TravelRequest::new(
            "Paris, France",
            "2024-09-15".parse().unwrap(),
            "2024-09-19".parse().unwrap(),
        ));
        state.apply(StateUpdate {
            hotels: vec![PlaceRecord::new("h1", "Hotel Lutetia")],
            restaurants: vec![PlaceRecord::new("r1", "Le Comptoir")],
            ..Default::default()
        });
        state
    }

    #[tokio::test]
    async fn test_success_stores_local_insight() {
        let stage = LocalInsightStage::new(Arc::new(MockGenerateClient::always("Take the metro")));
        let result = stage.run(&state_with_places()).await;

        assert_eq!(result.outcome, Outcome::Continue);
        assert_eq!(result.update.local_insight.as_deref(), Some("Take the metro"));
    }

    #[tokio::test]
    async fn test_failure_recorded_non_fatal() {
        let stage = LocalInsightStage::new(Arc::new(MockGenerateClient::new(vec![Err("timeout".to_string())])));
        let result = stage.run(&state_with_places()).await;

        assert_eq!(result.outcome, Outcome::Continue);
        assert!(result.update.failed_stages.contains(&StageName::LocalInsight));
    }

    #[test]
    fn test_prompt_names_top_places() {
        let prompt = LocalInsightStage::build_prompt(&state_with_places());
        assert!(prompt.contains("Hotel Lutetia"));
        assert!(prompt.contains("Le Comptoir"));
    }
}
