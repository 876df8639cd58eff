//! TravelRequest - the validated input to a planning run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Maximum trip length in whole days
pub const MAX_TRIP_DAYS: i64 = 30;

/// Maximum travelers per request
pub const MAX_TRAVELERS: u32 = 20;

/// A user travel request
///
/// Treated as immutable once validated. Every planning run starts from one
/// of these; `validate` is the single source of truth for the request
/// invariants and is called by the Intake stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelRequest {
    /// Destination, free-form (e.g. "Paris, France")
    pub destination: String,

    /// First day of the trip
    pub start: NaiveDate,

    /// Day after the last night (exclusive end)
    pub end: NaiveDate,

    /// Total budget in USD, if the traveler has one
    pub budget: Option<f64>,

    /// Interest tags used for activity selection (e.g. "museums", "food")
    pub interests: Vec<String>,

    /// Number of travelers
    pub travelers: u32,
}

impl TravelRequest {
    /// Create a request with a single traveler and no budget
    pub fn new(destination: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            destination: destination.into(),
            start,
            end,
            budget: None,
            interests: Vec::new(),
            travelers: 1,
        }
    }

    /// Trip duration in whole days
    pub fn duration(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Check all request invariants
    ///
    /// Start must strictly precede end, duration must be within
    /// `[1, MAX_TRIP_DAYS]`, budget non-negative, travelers within
    /// `[1, MAX_TRAVELERS]`, destination non-empty.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.destination.trim().is_empty() {
            return Err(PlannerError::Validation("destination must not be empty".to_string()));
        }

        if self.start >= self.end {
            return Err(PlannerError::Validation(format!(
                "start date {} must be before end date {}",
                self.start, self.end
            )));
        }

        let duration = self.duration();
        if duration > MAX_TRIP_DAYS {
            return Err(PlannerError::Validation(format!(
                "trip duration {duration} days exceeds maximum of {MAX_TRIP_DAYS}"
            )));
        }

        if let Some(budget) = self.budget
            && budget < 0.0
        {
            return Err(PlannerError::Validation(format!("budget {budget} must be non-negative")));
        }

        if self.travelers == 0 || self.travelers > MAX_TRAVELERS {
            return Err(PlannerError::Validation(format!(
                "travelers {} must be within [1, {MAX_TRAVELERS}]",
                self.travelers
            )));
        }

        Ok(())
    }

    /// Per-day budget, if a budget was given
    pub fn daily_budget(&self) -> Option<f64> {
        let days = self.duration();
        self.budget.filter(|_| days > 0).map(|b| b / days as f64)
    }

    /// Rough budget band used in prompts and activity selection
    pub fn budget_level(&self) -> &'static str {
        match self.daily_budget() {
            None => "unknown",
            Some(d) if d < 100.0 => "budget",
            Some(d) if d < 200.0 => "mid_range",
            Some(d) if d < 400.0 => "luxury",
            Some(_) => "ultra_luxury",
        }
    }
}
