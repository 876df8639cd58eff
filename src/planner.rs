//! Planner facade: wires the stage graph and maps terminal state to results

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::connectors::{PlacesSource, WeatherSource};
use crate::domain::{TravelItinerary, TravelRequest};
use crate::error::PlannerError;
use crate::graph::controller::{optimize_again, route_on_data};
use crate::graph::stages::{
    CritiqueStage, DataCollectionStage, FinalizationStage, InsufficientDataStage, IntakeStage, LocalInsightStage,
    OptimizeStage, PlanBuildStage, ResearchStage,
};
use crate::graph::{GraphBuilder, GraphError, StageName, Target, WorkflowGraph, WorkflowState};
use crate::llm::GenerateClient;

/// The travel-planning workflow
///
/// Construction validates the graph wiring; a planner that exists can run.
pub struct Planner {
    graph: WorkflowGraph,
}

impl Planner {
    pub fn new(
        places: Arc<dyn PlacesSource>,
        weather: Arc<dyn WeatherSource>,
        llm: Arc<dyn GenerateClient>,
        config: &Config,
    ) -> Result<Self, GraphError> {
        let graph = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(IntakeStage))?
            .stage(Box::new(DataCollectionStage::new(
                places,
                weather,
                config.connectors.search_radius_m,
            )))?
            .stage(Box::new(ResearchStage::new(Arc::clone(&llm))))?
            .stage(Box::new(LocalInsightStage::new(Arc::clone(&llm))))?
            .stage(Box::new(InsufficientDataStage))?
            .stage(Box::new(PlanBuildStage))?
            .stage(Box::new(CritiqueStage::new(llm)))?
            .stage(Box::new(OptimizeStage))?
            .stage(Box::new(FinalizationStage))?
            .edge(StageName::Intake, Target::Stage(StageName::DataCollection))
            .edge(StageName::DataCollection, Target::Stage(StageName::Research))
            .edge(StageName::Research, Target::Stage(StageName::LocalInsight))
            .conditional_edge(
                StageName::LocalInsight,
                &[
                    Target::Stage(StageName::PlanBuild),
                    Target::Stage(StageName::InsufficientData),
                ],
                route_on_data(),
            )
            .edge(StageName::InsufficientData, Target::End)
            .edge(StageName::PlanBuild, Target::Stage(StageName::Critique))
            .conditional_edge(
                StageName::Critique,
                &[
                    Target::Stage(StageName::Optimize),
                    Target::Stage(StageName::Finalization),
                ],
                optimize_again(config.workflow.max_optimization_rounds),
            )
            .edge(StageName::Optimize, Target::Stage(StageName::PlanBuild))
            .edge(StageName::Finalization, Target::End)
            .build()?;

        Ok(Self { graph })
    }

    /// Run the workflow and return the terminal state
    ///
    /// Useful when the caller wants the full run record (completed stages,
    /// critique history, error messages) rather than just the itinerary.
    pub async fn execute(&self, request: TravelRequest) -> Result<WorkflowState, GraphError> {
        info!(destination = %request.destination, "planner: starting run");
        let mut state = WorkflowState::new(request);
        self.graph.run(&mut state).await?;
        Ok(state)
    }

    /// Run the workflow and return the itinerary or a terminal error
    pub async fn run(&self, request: TravelRequest) -> Result<TravelItinerary, PlannerError> {
        let state = self
            .execute(request)
            .await
            .map_err(|e| PlannerError::Workflow {
                messages: vec![e.to_string()],
            })?;

        if let Some(itinerary) = state.final_result {
            return Ok(itinerary);
        }

        if state.failed_stages.contains(&StageName::Intake) {
            let message = state
                .error_messages
                .last()
                .cloned()
                .unwrap_or_else(|| "request rejected".to_string());
            return Err(PlannerError::Validation(message));
        }

        if state.completed_stages.contains(&StageName::InsufficientData) {
            return Err(PlannerError::insufficient_from(&state.error_messages));
        }

        Err(PlannerError::workflow_from(&state.error_messages))
    }
}
