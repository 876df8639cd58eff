//! Workflow state container and merge semantics
//!
//! One `WorkflowState` is created per planning request and threaded through
//! every stage. Stages never mutate it directly; they return a `StateUpdate`
//! that the executor applies. Each field has a declared merge kind:
//! overwrite for scalars, append-unique for the accumulating lists. The
//! kind is fixed by the shape of `StateUpdate` itself (`Option` vs `Vec`),
//! so a field cannot be merged with the wrong semantics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DayPlan, ForecastDay, PlaceRecord, TravelItinerary, TravelRequest};

/// Named stages of the planning graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Intake,
    DataCollection,
    Research,
    LocalInsight,
    InsufficientData,
    PlanBuild,
    Critique,
    Optimize,
    Finalization,
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Intake => "intake",
            Self::DataCollection => "data_collection",
            Self::Research => "research",
            Self::LocalInsight => "local_insight",
            Self::InsufficientData => "insufficient_data",
            Self::PlanBuild => "plan_build",
            Self::Critique => "critique",
            Self::Optimize => "optimize",
            Self::Finalization => "finalization",
        };
        write!(f, "{name}")
    }
}

/// Budget position computed during critique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    NoBudget,
    WithinBudget,
    SlightlyOver,
    OverBudget,
}

/// Kind of actionable issue found by the critique stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CritiqueIssueKind {
    /// Two activities on the same day overlap in time
    Overlap,
    /// A weather-sensitive outdoor activity is scheduled on a wet day
    WeatherMismatch,
    /// A day carries too many activities
    Imbalance,
    /// Estimated cost exceeds the stated budget
    BudgetOverrun,
}

/// One actionable issue the optimizer can repair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritiqueIssue {
    pub kind: CritiqueIssueKind,
    pub date: NaiveDate,
    pub detail: String,
}

/// Feedback record appended by each critique pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritiqueFeedback {
    /// 1-based critique pass number
    pub round: u32,

    pub issues: Vec<CritiqueIssue>,

    /// LLM review text, when the generation call succeeded
    pub summary: Option<String>,

    pub estimated_cost: f64,
    pub budget_status: BudgetStatus,
}

impl CritiqueFeedback {
    /// Whether this feedback reports anything the optimizer can act on
    pub fn actionable(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// The mutable record threaded through every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    // Overwrite fields
    pub request: TravelRequest,
    pub current_stage: Option<StageName>,
    /// Monotonically non-decreasing, bounded by the configured maximum
    pub optimization_rounds: u32,
    pub final_result: Option<TravelItinerary>,
    pub destination_insight: Option<String>,
    pub local_insight: Option<String>,

    // Append-unique fields
    pub completed_stages: Vec<StageName>,
    pub failed_stages: Vec<StageName>,
    pub error_messages: Vec<String>,
    pub hotels: Vec<PlaceRecord>,
    pub restaurants: Vec<PlaceRecord>,
    pub attractions: Vec<PlaceRecord>,
    pub forecast_days: Vec<ForecastDay>,
    pub day_plans: Vec<DayPlan>,
    pub critique_rounds: Vec<CritiqueFeedback>,
}

impl WorkflowState {
    /// Create the initial state for a planning request
    pub fn new(request: TravelRequest) -> Self {
        Self {
            request,
            current_stage: None,
            optimization_rounds: 0,
            final_result: None,
            destination_insight: None,
            local_insight: None,
            completed_stages: Vec::new(),
            failed_stages: Vec::new(),
            error_messages: Vec::new(),
            hotels: Vec::new(),
            restaurants: Vec::new(),
            attractions: Vec::new(),
            forecast_days: Vec::new(),
            day_plans: Vec::new(),
            critique_rounds: Vec::new(),
        }
    }

    /// Apply a partial update with per-field merge semantics
    ///
    /// Overwrite fields replace only when the update carries a value.
    /// Append-unique fields merge keyed on their natural identity: stage
    /// name, place id, forecast date, day-plan date, critique round. Day
    /// plans with an already-present date replace that entry (the optimizer
    /// repairs existing plans in place).
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(stage) = update.current_stage {
            self.current_stage = Some(stage);
        }
        if let Some(rounds) = update.optimization_rounds {
            // Monotonic: never decrease
            self.optimization_rounds = self.optimization_rounds.max(rounds);
        }
        if let Some(result) = update.final_result {
            self.final_result = Some(result);
        }
        if let Some(insight) = update.destination_insight {
            self.destination_insight = Some(insight);
        }
        if let Some(insight) = update.local_insight {
            self.local_insight = Some(insight);
        }

        for stage in update.completed_stages {
            if !self.completed_stages.contains(&stage) && !self.failed_stages.contains(&stage) {
                self.completed_stages.push(stage);
            }
        }
        for stage in update.failed_stages {
            if !self.failed_stages.contains(&stage) && !self.completed_stages.contains(&stage) {
                self.failed_stages.push(stage);
            }
        }
        for message in update.error_messages {
            if !self.error_messages.contains(&message) {
                self.error_messages.push(message);
            }
        }

        append_unique_by(&mut self.hotels, update.hotels, |p| p.id.clone());
        append_unique_by(&mut self.restaurants, update.restaurants, |p| p.id.clone());
        append_unique_by(&mut self.attractions, update.attractions, |p| p.id.clone());
        append_unique_by(&mut self.forecast_days, update.forecast_days, |d| d.date);

        for plan in update.day_plans {
            match self.day_plans.iter_mut().find(|p| p.date == plan.date) {
                Some(existing) => *existing = plan,
                None => self.day_plans.push(plan),
            }
        }

        for feedback in update.critique_rounds {
            if !self.critique_rounds.iter().any(|f| f.round == feedback.round) {
                self.critique_rounds.push(feedback);
            }
        }
    }

    /// Total places collected across all categories
    pub fn place_count(&self) -> usize {
        self.hotels.len() + self.restaurants.len() + self.attractions.len()
    }

    /// Whether enough external data exists to build a plan
    pub fn has_sufficient_data(&self) -> bool {
        self.place_count() > 0
    }

    /// Latest critique feedback, if any
    pub fn latest_feedback(&self) -> Option<&CritiqueFeedback> {
        self.critique_rounds.last()
    }
}

/// A partial update produced by one stage (or one fan-out task)
///
/// `Option` fields carry overwrite semantics; `Vec` fields carry
/// append-unique semantics. Declared once here, this is the whole merge
/// contract: no field can be merged with a kind it wasn't declared for.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub current_stage: Option<StageName>,
    pub optimization_rounds: Option<u32>,
    pub final_result: Option<TravelItinerary>,
    pub destination_insight: Option<String>,
    pub local_insight: Option<String>,

    pub completed_stages: Vec<StageName>,
    pub failed_stages: Vec<StageName>,
    pub error_messages: Vec<String>,
    pub hotels: Vec<PlaceRecord>,
    pub restaurants: Vec<PlaceRecord>,
    pub attractions: Vec<PlaceRecord>,
    pub forecast_days: Vec<ForecastDay>,
    pub day_plans: Vec<DayPlan>,
    pub critique_rounds: Vec<CritiqueFeedback>,
}

impl StateUpdate {
    /// An update announcing that a stage is running
    pub fn entering(stage: StageName) -> Self {
        Self {
            current_stage: Some(stage),
            ..Default::default()
        }
    }

    /// Mark a stage completed
    pub fn completed(mut self, stage: StageName) -> Self {
        self.completed_stages.push(stage);
        self
    }

    /// Mark a stage failed with an error message
    pub fn failed(mut self, stage: StageName, message: impl Into<String>) -> Self {
        self.failed_stages.push(stage);
        self.error_messages.push(format!("{stage}: {}", message.into()));
        self
    }

    /// Record an error message without failing the stage
    pub fn noting(mut self, stage: StageName, message: impl Into<String>) -> Self {
        self.error_messages.push(format!("{stage}: {}", message.into()));
        self
    }

    /// Fold another partial update into this one
    ///
    /// Used by the fan-out to combine per-source updates before a single
    /// apply. Overwrite fields take the other side's value when present.
    pub fn merge(mut self, other: StateUpdate) -> Self {
        self.current_stage = other.current_stage.or(self.current_stage);
        self.optimization_rounds = other.optimization_rounds.or(self.optimization_rounds);
        self.final_result = other.final_result.or(self.final_result);
        self.destination_insight = other.destination_insight.or(self.destination_insight);
        self.local_insight = other.local_insight.or(self.local_insight);

        self.completed_stages.extend(other.completed_stages);
        self.failed_stages.extend(other.failed_stages);
        self.error_messages.extend(other.error_messages);
        self.hotels.extend(other.hotels);
        self.restaurants.extend(other.restaurants);
        self.attractions.extend(other.attractions);
        self.forecast_days.extend(other.forecast_days);
        self.day_plans.extend(other.day_plans);
        self.critique_rounds.extend(other.critique_rounds);
        self
    }
}

fn append_unique_by<T, K: PartialEq>(target: &mut Vec<T>, source: Vec<T>, key: impl Fn(&T) -> K) {
    for item in source {
        let k = key(&item);
        if !target.iter().any(|existing| key(existing) == k) {
            target.push(item);
        }
    }
}
