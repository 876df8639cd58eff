//! Critique stage: deterministic plan review plus an optional LLM summary

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Stage, StageResult};
use crate::domain::DayPlan;
use crate::graph::state::{
    BudgetStatus, CritiqueFeedback, CritiqueIssue, CritiqueIssueKind, StageName, StateUpdate, WorkflowState,
};
use crate::llm::GenerateClient;

/// Nightly lodging cost per price-level tier
const LODGING_RATE_PER_LEVEL: f64 = 50.0;
/// Daily food estimate per traveler party
const DAILY_FOOD_COST: f64 = 80.0;
/// Daily activities estimate per traveler party
const DAILY_ACTIVITY_COST: f64 = 60.0;
/// Budget slack before an overrun becomes actionable
const BUDGET_TOLERANCE: f64 = 1.1;
/// More activities than this in one day reads as overpacked
const MAX_ACTIVITIES_PER_DAY: usize = 5;

/// Rough trip cost: average nightly rate of the top hotels, plus the costed
/// activities of each planned day, plus flat daily estimates for days that
/// have no plan yet
///
/// Built plans contribute their actual activity costs so that dropping or
/// swapping an activity moves the number the next critique pass re-checks.
pub(crate) fn estimate_trip_cost(state: &WorkflowState) -> f64 {
    let duration = state.request.duration().max(0) as f64;

    let top: Vec<f64> = state
        .hotels
        .iter()
        .take(3)
        .map(|h| h.price_level as f64 * LODGING_RATE_PER_LEVEL)
        .collect();
    let nightly = if top.is_empty() {
        0.0
    } else {
        top.iter().sum::<f64>() / top.len() as f64
    };

    let planned: f64 = state.day_plans.iter().map(|p| p.estimated_cost()).sum();
    let unplanned_days = (duration - state.day_plans.len() as f64).max(0.0);

    nightly * duration + planned + (DAILY_FOOD_COST + DAILY_ACTIVITY_COST) * unplanned_days
}

/// Reviews the built plan and records actionable issues
///
/// The issue checks are deterministic; the LLM is only asked for a prose
/// summary and its failure never blocks the run.
pub struct CritiqueStage {
    llm: Arc<dyn GenerateClient>,
}

impl CritiqueStage {
    pub fn new(llm: Arc<dyn GenerateClient>) -> Self {
        Self { llm }
    }

    fn day_issues(plan: &DayPlan) -> Vec<CritiqueIssue> {
        let mut issues = Vec::new();

        for pair in plan.activities.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                issues.push(CritiqueIssue {
                    kind: CritiqueIssueKind::Overlap,
                    date: plan.date,
                    detail: format!("'{}' overlaps '{}'", pair[0].name, pair[1].name),
                });
            }
        }

        if let Some(forecast) = &plan.forecast
            && forecast.is_wet()
        {
            for activity in &plan.activities {
                if activity.weather_sensitive && !activity.indoor {
                    issues.push(CritiqueIssue {
                        kind: CritiqueIssueKind::WeatherMismatch,
                        date: plan.date,
                        detail: format!(
                            "'{}' is outdoors with {}% precipitation chance",
                            activity.name, forecast.precipitation_chance
                        ),
                    });
                }
            }
        }

        if plan.activities.len() > MAX_ACTIVITIES_PER_DAY {
            issues.push(CritiqueIssue {
                kind: CritiqueIssueKind::Imbalance,
                date: plan.date,
                detail: format!("{} activities scheduled", plan.activities.len()),
            });
        }

        issues
    }

    fn budget_review(state: &WorkflowState, estimated: f64) -> (BudgetStatus, Option<CritiqueIssue>) {
        let Some(budget) = state.request.budget else {
            return (BudgetStatus::NoBudget, None);
        };

        if estimated <= budget {
            (BudgetStatus::WithinBudget, None)
        } else if estimated <= budget * BUDGET_TOLERANCE {
            (BudgetStatus::SlightlyOver, None)
        } else {
            let issue = CritiqueIssue {
                kind: CritiqueIssueKind::BudgetOverrun,
                date: state.request.start,
                detail: format!("estimated {estimated:.0} against budget {budget:.0}"),
            };
            (BudgetStatus::OverBudget, Some(issue))
        }
    }

    fn build_prompt(state: &WorkflowState, issues: &[CritiqueIssue]) -> String {
        let issue_lines = if issues.is_empty() {
            "none".to_string()
        } else {
            issues
                .iter()
                .map(|i| format!("- {} on {}: {}", issue_kind_label(i.kind), i.date, i.detail))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Review this {}-day itinerary for {} as a travel quality critic.\n\
             Detected issues:\n{issue_lines}\n\
             Give a two-sentence assessment of overall plan quality.",
            state.request.duration(),
            state.request.destination,
        )
    }
}

fn issue_kind_label(kind: CritiqueIssueKind) -> &'static str {
    match kind {
        CritiqueIssueKind::Overlap => "overlap",
        CritiqueIssueKind::WeatherMismatch => "weather mismatch",
        CritiqueIssueKind::Imbalance => "imbalance",
        CritiqueIssueKind::BudgetOverrun => "budget overrun",
    }
}

#[async_trait]
impl Stage for CritiqueStage {
    fn name(&self) -> StageName {
        StageName::Critique
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let mut issues: Vec<CritiqueIssue> = state.day_plans.iter().flat_map(Self::day_issues).collect();

        let estimated_cost = estimate_trip_cost(state);
        let (budget_status, budget_issue) = Self::budget_review(state, estimated_cost);
        issues.extend(budget_issue);

        let prompt = Self::build_prompt(state, &issues);
        let context = serde_json::json!({
            "issues": issues.len(),
            "estimated_cost": estimated_cost,
        });
        let summary = match self.llm.generate(&prompt, &context).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "critique: summary generation failed");
                None
            }
        };

        let round = state.critique_rounds.len() as u32 + 1;
        info!(
            round,
            issues = issues.len(),
            estimated_cost,
            ?budget_status,
            "critique: pass complete"
        );

        let mut update = StateUpdate::entering(self.name()).completed(self.name());
        update.critique_rounds.push(CritiqueFeedback {
            round,
            issues,
            summary,
            estimated_cost,
            budget_status,
        });
        StageResult::advance(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::mock::sample_places;
    use crate::domain::{ActivityCategory, ForecastDay, PlaceCategory, PlanActivity, TravelRequest};
    use crate::llm::client::mock::MockGenerateClient;

    fn base_state() -> WorkflowState {
        let mut state = WorkflowState::new(TravelRequest::new(
            "Paris, France",
            "2024-09-15".parse().unwrap(),
            "2024-09-19".parse().unwrap(),
        ));
        state.apply(StateUpdate {
            hotels: sample_places(PlaceCategory::Hotel, 5),
            ..Default::default()
        });
        state
    }

    fn stage() -> CritiqueStage {
        CritiqueStage::new(Arc::new(MockGenerateClient::always("Solid plan overall.")))
    }

    fn wet_forecast(date: &str) -> ForecastDay {
        ForecastDay {
            date: date.parse().unwrap(),
            temp_high: 15.0,
            temp_low: 9.0,
            condition: "Heavy rain".to_string(),
            humidity: 90,
            wind_speed: 20.0,
            precipitation_chance: 80,
        }
    }

    #[test]
    fn test_cost_estimate_uses_top_hotels() {
        let state = base_state();
        // Sample hotels are price level 2: 2 * 50 nightly, 4 nights,
        // plus (80 + 60) * 4 for the not-yet-planned days.
        let cost = estimate_trip_cost(&state);
        assert_eq!(cost, 100.0 * 4.0 + 140.0 * 4.0);
    }

    #[test]
    fn test_cost_estimate_uses_planned_activity_costs() {
        let mut state = base_state();
        let mut plan = DayPlan::new("2024-09-15".parse().unwrap(), None);
        let mut activity = PlanActivity::new("Cruise", ActivityCategory::Sightseeing, "09:00:00".parse().unwrap());
        activity.cost = Some(120.0);
        plan.insert(activity);
        state.apply(StateUpdate {
            day_plans: vec![plan],
            ..Default::default()
        });

        // One planned day contributes its real costs, three remain estimated
        let cost = estimate_trip_cost(&state);
        assert_eq!(cost, 100.0 * 4.0 + 120.0 + 140.0 * 3.0);
    }

    #[tokio::test]
    async fn test_clean_plan_yields_no_issues() {
        let mut state = base_state();
        let mut plan = DayPlan::new("2024-09-15".parse().unwrap(), None);
        plan.insert(PlanActivity::new(
            "Louvre",
            ActivityCategory::Museum,
            "09:00:00".parse().unwrap(),
        ));
        state.apply(StateUpdate {
            day_plans: vec![plan],
            ..Default::default()
        });

        let result = stage().run(&state).await;
        let feedback = &result.update.critique_rounds[0];
        assert!(!feedback.actionable());
        assert_eq!(feedback.round, 1);
        assert_eq!(feedback.summary.as_deref(), Some("Solid plan overall."));
    }

    #[tokio::test]
    async fn test_detects_overlap() {
        let mut state = base_state();
        let mut plan = DayPlan::new("2024-09-15".parse().unwrap(), None);
        plan.insert(PlanActivity::new(
            "Louvre",
            ActivityCategory::Museum,
            "09:00:00".parse().unwrap(),
        ));
        plan.insert(PlanActivity::new(
            "Walking tour",
            ActivityCategory::Sightseeing,
            "10:00:00".parse().unwrap(),
        ));
        state.apply(StateUpdate {
            day_plans: vec![plan],
            ..Default::default()
        });

        let result = stage().run(&state).await;
        let feedback = &result.update.critique_rounds[0];
        assert!(feedback.issues.iter().any(|i| i.kind == CritiqueIssueKind::Overlap));
    }

    #[tokio::test]
    async fn test_detects_weather_mismatch_on_wet_day() {
        let mut state = base_state();
        let mut plan = DayPlan::new("2024-09-15".parse().unwrap(), Some(wet_forecast("2024-09-15")));
        plan.insert(PlanActivity::new(
            "Jardin du Luxembourg",
            ActivityCategory::Park,
            "09:00:00".parse().unwrap(),
        ));
        state.apply(StateUpdate {
            day_plans: vec![plan],
            ..Default::default()
        });

        let result = stage().run(&state).await;
        let feedback = &result.update.critique_rounds[0];
        assert!(
            feedback
                .issues
                .iter()
                .any(|i| i.kind == CritiqueIssueKind::WeatherMismatch)
        );
    }

    #[tokio::test]
    async fn test_detects_budget_overrun() {
        let mut state = base_state();
        state.request.budget = Some(100.0);

        let result = stage().run(&state).await;
        let feedback = &result.update.critique_rounds[0];
        assert_eq!(feedback.budget_status, BudgetStatus::OverBudget);
        assert!(
            feedback
                .issues
                .iter()
                .any(|i| i.kind == CritiqueIssueKind::BudgetOverrun)
        );
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_feedback() {
        let mut state = base_state();
        state.request.budget = Some(100.0);
        let stage = CritiqueStage::new(Arc::new(MockGenerateClient::new(vec![Err("offline".to_string())])));

        let result = stage.run(&state).await;
        let feedback = &result.update.critique_rounds[0];
        assert!(feedback.summary.is_none());
        assert!(feedback.actionable());
        assert!(result.update.completed_stages.contains(&StageName::Critique));
    }

    #[tokio::test]
    async fn test_round_increments_with_history() {
        let mut state = base_state();
        state.apply(StateUpdate {
            critique_rounds: vec![CritiqueFeedback {
                round: 1,
                issues: Vec::new(),
                summary: None,
                estimated_cost: 0.0,
                budget_status: BudgetStatus::NoBudget,
            }],
            ..Default::default()
        });

        let result = stage().run(&state).await;
        assert_eq!(result.update.critique_rounds[0].round, 2);
    }
}
