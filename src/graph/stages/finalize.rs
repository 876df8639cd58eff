//! Finalization stage: assembles the itinerary from accumulated state

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use super::{Stage, StageResult, estimate_trip_cost};
use crate::domain::TravelItinerary;
use crate::graph::state::{StageName, StateUpdate, WorkflowState};

const MAX_HOTELS: usize = 5;
const MAX_ATTRACTIONS: usize = 10;
const MAX_RESTAURANTS: usize = 8;

/// Assembles the final itinerary
///
/// Fatal when no day plans exist: there is nothing to hand back and the
/// run is reported as failed rather than returning an empty shell.
pub struct FinalizationStage;

impl FinalizationStage {
    fn recommendations(state: &WorkflowState) -> Vec<String> {
        let mut recommendations = Vec::new();
        if let Some(insight) = &state.destination_insight {
            recommendations.push(insight.clone());
        }
        if let Some(insight) = &state.local_insight {
            recommendations.push(insight.clone());
        }
        if let Some(feedback) = state.latest_feedback()
            && let Some(summary) = &feedback.summary
        {
            recommendations.push(summary.clone());
        }
        recommendations
    }
}

#[async_trait]
impl Stage for FinalizationStage {
    fn name(&self) -> StageName {
        StageName::Finalization
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let update = StateUpdate::entering(self.name());

        if state.day_plans.is_empty() {
            warn!("finalization: no day plans to assemble");
            return StageResult::abort(update.failed(self.name(), "no day plans to assemble"));
        }

        let mut day_plans = state.day_plans.clone();
        day_plans.sort_by_key(|p| p.date);

        let itinerary = TravelItinerary {
            destination: state.request.destination.clone(),
            start: state.request.start,
            end: state.request.end,
            duration: state.request.duration(),
            hotels: state.hotels.iter().take(MAX_HOTELS).cloned().collect(),
            attractions: state.attractions.iter().take(MAX_ATTRACTIONS).cloned().collect(),
            restaurants: state.restaurants.iter().take(MAX_RESTAURANTS).cloned().collect(),
            forecast: state.forecast_days.clone(),
            day_plans,
            total_estimated_cost: Some(estimate_trip_cost(state)),
            recommendations: Self::recommendations(state),
            created_at: Utc::now(),
        };

        info!(
            destination = %itinerary.destination,
            days = itinerary.day_plans.len(),
            optimization_rounds = state.optimization_rounds,
            "finalization: itinerary assembled"
        );

        let mut update = update.completed(self.name());
        update.final_result = Some(itinerary);
        StageResult::advance(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::mock::sample_places;
    use crate::domain::{DayPlan, PlaceCategory, TravelRequest};
    use crate::graph::stages::Outcome;

    fn state_with_plans() -> WorkflowState {
        let mut state = WorkflowState::new(TravelRequest::new(
            "Paris, France",
            "2024-09-15".parse().unwrap(),
            "2024-09-19".parse().unwrap(),
        ));
        state.apply(StateUpdate {
            hotels: sample_places(PlaceCategory::Hotel, 8),
            restaurants: sample_places(PlaceCategory::Restaurant, 12),
            attractions: sample_places(PlaceCategory::Attraction, 15),
            day_plans: vec![
                DayPlan::new("2024-09-16".parse().unwrap(), None),
                DayPlan::new("2024-09-15".parse().unwrap(), None),
            ],
            destination_insight: Some("Go early.".to_string()),
            ..Default::default()
        });
        state
    }

    #[tokio::test]
    async fn test_assembles_and_truncates() {
        let result = FinalizationStage.run(&state_with_plans()).await;

        assert_eq!(result.outcome, Outcome::Continue);
        let itinerary = result.update.final_result.unwrap();
        assert_eq!(itinerary.hotels.len(), 5);
        assert_eq!(itinerary.attractions.len(), 10);
        assert_eq!(itinerary.restaurants.len(), 8);
        assert_eq!(itinerary.duration, 4);
        // Day plans come back in date order
        assert!(itinerary.day_plans[0].date < itinerary.day_plans[1].date);
        assert_eq!(itinerary.recommendations, vec!["Go early.".to_string()]);
        assert!(itinerary.total_estimated_cost.is_some());
    }

    #[tokio::test]
    async fn test_no_day_plans_is_fatal() {
        let state = WorkflowState::new(TravelRequest::new(
            "Paris, France",
            "2024-09-15".parse().unwrap(),
            "2024-09-19".parse().unwrap(),
        ));

        let result = FinalizationStage.run(&state).await;
        assert_eq!(result.outcome, Outcome::Fatal);
        assert!(result.update.failed_stages.contains(&StageName::Finalization));
        assert!(result.update.final_result.is_none());
    }
}
