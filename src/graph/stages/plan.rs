//! Plan-build stage: turns collected places into day plans

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use tracing::info;

use super::{Stage, StageResult};
use crate::domain::{ActivityCategory, DayPlan, PlaceRecord, PlanActivity};
use crate::graph::state::{StageName, StateUpdate, WorkflowState};

const MORNING: &str = "09:00:00";
const LUNCH: &str = "12:30:00";
const AFTERNOON: &str = "14:30:00";
const DINNER: &str = "19:00:00";

/// Builds a day plan per trip date from the collected places
///
/// Idempotent across optimization loops: dates that already have a plan are
/// left alone, so repairs made by the optimizer survive a second pass.
pub struct PlanBuildStage;

impl PlanBuildStage {
    /// Attractions ordered for scheduling: interest matches first, then rating
    fn rank_attractions(state: &WorkflowState) -> Vec<&PlaceRecord> {
        let interests = &state.request.interests;
        let mut ranked: Vec<&PlaceRecord> = state.attractions.iter().collect();
        ranked.sort_by(|a, b| {
            let match_a = a.matches_interests(interests);
            let match_b = b.matches_interests(interests);
            match_b
                .cmp(&match_a)
                .then(b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal))
        });
        ranked
    }

    /// Restaurants ordered for scheduling: the request's budget band caps
    /// the preferred price tier, then rating decides
    fn rank_restaurants(state: &WorkflowState) -> Vec<&PlaceRecord> {
        let price_cap: u8 = match state.request.budget_level() {
            "budget" => 1,
            "mid_range" => 2,
            "luxury" => 3,
            _ => 4,
        };
        let mut ranked: Vec<&PlaceRecord> = state.restaurants.iter().collect();
        ranked.sort_by(|a, b| {
            let over_a = a.price_level > price_cap;
            let over_b = b.price_level > price_cap;
            over_a
                .cmp(&over_b)
                .then(b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal))
        });
        ranked
    }

    fn attraction_activity(place: &PlaceRecord, start: NaiveTime) -> PlanActivity {
        let category = ActivityCategory::from_place_tag(&place.category);
        let mut activity = PlanActivity::new(place.name.clone(), category, start);
        if place.price_level > 0 {
            activity.cost = Some(place.price_level as f64 * 10.0);
        }
        activity
    }

    fn dining_activity(place: &PlaceRecord, start: NaiveTime, cost: f64) -> PlanActivity {
        let mut activity = PlanActivity::new(place.name.clone(), ActivityCategory::Dining, start);
        // Meals anchor the day
        activity.priority = 1;
        activity.cost = Some(cost);
        activity
    }

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap_or_else(|_| NaiveTime::MIN)
    }
}

#[async_trait]
impl Stage for PlanBuildStage {
    fn name(&self) -> StageName {
        StageName::PlanBuild
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let mut update = StateUpdate::entering(self.name());
        let attractions = Self::rank_attractions(state);
        let restaurants = Self::rank_restaurants(state);
        let duration = state.request.duration().max(0) as usize;

        let mut built = 0;
        for day in 0..duration {
            let date = state.request.start + Duration::days(day as i64);
            if state.day_plans.iter().any(|p| p.date == date) {
                continue;
            }

            let forecast = state.forecast_days.iter().find(|f| f.date == date).cloned();
            let mut plan = DayPlan::new(date, forecast);

            if let Some(place) = attractions.get((day * 2) % attractions.len().max(1)).copied() {
                plan.insert(Self::attraction_activity(place, Self::time(MORNING)));
            }
            if !restaurants.is_empty() {
                let lunch = restaurants[day % restaurants.len()];
                plan.insert(Self::dining_activity(lunch, Self::time(LUNCH), 30.0));
            }
            if attractions.len() > 1
                && let Some(place) = attractions.get((day * 2 + 1) % attractions.len()).copied()
            {
                plan.insert(Self::attraction_activity(place, Self::time(AFTERNOON)));
            }
            if !restaurants.is_empty() {
                let dinner = restaurants[(day + 1) % restaurants.len()];
                plan.insert(Self::dining_activity(dinner, Self::time(DINNER), 50.0));
            }

            update.day_plans.push(plan);
            built += 1;
        }

        info!(
            days = duration,
            newly_built = built,
            attractions = attractions.len(),
            "plan_build: day plans assembled"
        );

        StageResult::advance(update.completed(self.name()))
    }
}
