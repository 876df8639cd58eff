//! Optimize stage: repairs the issues found by the latest critique pass

use async_trait::async_trait;
use chrono::Duration;
use tracing::info;

use super::{Stage, StageResult};
use crate::domain::{DayPlan, PlaceRecord, PlanActivity};
use crate::graph::state::{CritiqueIssueKind, StageName, StateUpdate, WorkflowState};

/// Applies targeted repairs to day plans based on critique feedback
///
/// Each issue kind has one repair. Repaired plans are returned with their
/// original dates so the merge replaces the broken versions in place.
pub struct OptimizeStage;

impl OptimizeStage {
    /// Shift later activities so no two overlap
    fn fix_overlaps(plan: &mut DayPlan) {
        for i in 1..plan.activities.len() {
            let prev_end = plan.activities[i - 1].end();
            if plan.activities[i].start < prev_end {
                plan.activities[i].start = prev_end + Duration::minutes(30);
            }
        }
        plan.activities.sort_by_key(|a| a.start);
    }

    /// Swap weather-exposed activities for indoor attractions on wet days
    fn fix_weather(plan: &mut DayPlan, attractions: &[PlaceRecord]) {
        let scheduled: Vec<String> = plan.activities.iter().map(|a| a.name.clone()).collect();
        let mut replacements = attractions
            .iter()
            .filter(|p| p.is_indoor() && !scheduled.contains(&p.name));

        for activity in &mut plan.activities {
            if activity.weather_sensitive && !activity.indoor {
                match replacements.next() {
                    Some(indoor) => {
                        let category = crate::domain::ActivityCategory::from_place_tag(&indoor.category);
                        let mut swapped = PlanActivity::new(indoor.name.clone(), category, activity.start);
                        swapped.priority = activity.priority;
                        *activity = swapped;
                    }
                    None => {
                        // No indoor alternative: keep must-dos, drop the rest
                        if activity.priority > 1 {
                            activity.priority = u8::MAX; // marked for removal below
                        }
                    }
                }
            }
        }
        plan.activities.retain(|a| a.priority != u8::MAX);
    }

    /// Drop the most expendable activities until the day is balanced
    fn fix_imbalance(plan: &mut DayPlan, max_per_day: usize) {
        while plan.activities.len() > max_per_day {
            let Some((index, _)) = plan
                .activities
                .iter()
                .enumerate()
                .filter(|(_, a)| a.priority > 1)
                .max_by_key(|(_, a)| a.priority)
            else {
                break;
            };
            plan.activities.remove(index);
        }
    }

    /// Drop the single most expensive expendable activity across all days
    fn fix_budget(plans: &mut [DayPlan]) {
        let mut costliest: Option<(usize, usize, f64)> = None;
        for (day_index, plan) in plans.iter().enumerate() {
            for (act_index, activity) in plan.activities.iter().enumerate() {
                if activity.priority > 1
                    && let Some(cost) = activity.cost
                    && costliest.is_none_or(|(_, _, top)| cost > top)
                {
                    costliest = Some((day_index, act_index, cost));
                }
            }
        }
        if let Some((day_index, act_index, _)) = costliest {
            plans[day_index].activities.remove(act_index);
        }
    }
}

const MAX_ACTIVITIES_PER_DAY: usize = 5;

#[async_trait]
impl Stage for OptimizeStage {
    fn name(&self) -> StageName {
        StageName::Optimize
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let update = StateUpdate::entering(self.name());
        let Some(feedback) = state.latest_feedback() else {
            return StageResult::advance(update.completed(self.name()));
        };

        let mut plans = state.day_plans.clone();
        let mut repaired_dates = Vec::new();

        for issue in &feedback.issues {
            match issue.kind {
                CritiqueIssueKind::BudgetOverrun => {
                    Self::fix_budget(&mut plans);
                    repaired_dates.extend(plans.iter().map(|p| p.date));
                }
                kind => {
                    if let Some(plan) = plans.iter_mut().find(|p| p.date == issue.date) {
                        match kind {
                            CritiqueIssueKind::Overlap => Self::fix_overlaps(plan),
                            CritiqueIssueKind::WeatherMismatch => Self::fix_weather(plan, &state.attractions),
                            CritiqueIssueKind::Imbalance => Self::fix_imbalance(plan, MAX_ACTIVITIES_PER_DAY),
                            CritiqueIssueKind::BudgetOverrun => unreachable!(),
                        }
                        repaired_dates.push(plan.date);
                    }
                }
            }
        }

        repaired_dates.sort();
        repaired_dates.dedup();
        info!(
            round = feedback.round,
            issues = feedback.issues.len(),
            repaired_days = repaired_dates.len(),
            "optimize: repairs applied"
        );

        let mut update = update.completed(self.name());
        update.day_plans = plans
            .into_iter()
            .filter(|p| repaired_dates.contains(&p.date))
            .collect();
        StageResult::advance(update)
    }
}
