//! Research stage: LLM-assisted destination analysis

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Stage, StageResult};
use crate::graph::state::{StageName, StateUpdate, WorkflowState};
use crate::llm::GenerateClient;

/// Derives destination insight from the collected data
///
/// Non-fatal: a failed generation call is recorded and the run proceeds
/// without the insight.
pub struct ResearchStage {
    llm: Arc<dyn GenerateClient>,
}

impl ResearchStage {
    pub fn new(llm: Arc<dyn GenerateClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(state: &WorkflowState) -> String {
        let request = &state.request;
        format!(
            "As a destination research expert, analyze {} for travelers interested in {}.\n\
             Available data: {} hotels, {} attractions, {} restaurants.\n\
             Cover what makes the destination special for these interests, which \
             areas to focus on, cultural considerations, and optimal timing for activities.",
            request.destination,
            if request.interests.is_empty() {
                "general sightseeing".to_string()
            } else {
                request.interests.join(", ")
            },
            state.hotels.len(),
            state.attractions.len(),
            state.restaurants.len(),
        )
    }
}

#[async_trait]
impl Stage for ResearchStage {
    fn name(&self) -> StageName {
        StageName::Research
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let update = StateUpdate::entering(self.name());
        let prompt = Self::build_prompt(state);
        let context = serde_json::json!({
            "hotels": state.hotels.len(),
            "attractions": state.attractions.len(),
            "restaurants": state.restaurants.len(),
            "interests": state.request.interests,
        });

        match self.llm.generate(&prompt, &context).await {
            Ok(insight) => {
                info!(insight_len = insight.len(), "research: destination insight generated");
                let mut update = update.completed(self.name());
                update.destination_insight = Some(insight);
                StageResult::advance(update)
            }
            Err(e) => {
                warn!(error = %e, "research: text generation failed");
                StageResult::advance(update.failed(self.name(), format!("text generation failed: {e}")))
            }
        }
    }
}
