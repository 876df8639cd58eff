//! Stage functions of the planning graph
//!
//! Each stage is an independently testable unit implementing the `Stage`
//! trait: it reads the current state and returns a partial update plus an
//! outcome. Expected failures (missing upstream data, unavailable services)
//! are recorded in the update's error messages and failed-stages list, never
//! raised; `Outcome::Fatal` is reserved for the contracts that abort the run
//! (Intake validation, Finalization with nothing to assemble).

use async_trait::async_trait;

use super::state::{StageName, StateUpdate, WorkflowState};

mod collect;
mod critique;
mod finalize;
mod insight;
mod insufficient;
mod intake;
mod optimize;
mod plan;
mod research;

pub use collect::DataCollectionStage;
pub use critique::CritiqueStage;
pub use finalize::FinalizationStage;
pub use insight::LocalInsightStage;
pub use insufficient::InsufficientDataStage;
pub use intake::IntakeStage;
pub use optimize::OptimizeStage;
pub use plan::PlanBuildStage;
pub use research::ResearchStage;

pub(crate) use critique::estimate_trip_cost;

/// Whether the executor may continue past this stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Proceed to the next edge
    Continue,
    /// Abort the run: route directly to the terminal marker
    Fatal,
}

/// The result of one stage invocation
#[derive(Debug)]
pub struct StageResult {
    pub update: StateUpdate,
    pub outcome: Outcome,
}

impl StageResult {
    /// A non-fatal result carrying an update
    pub fn advance(update: StateUpdate) -> Self {
        Self {
            update,
            outcome: Outcome::Continue,
        }
    }

    /// A fatal result carrying an update
    pub fn abort(update: StateUpdate) -> Self {
        Self {
            update,
            outcome: Outcome::Fatal,
        }
    }
}

/// One named transformation step in the workflow
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage's name in the edge table
    fn name(&self) -> StageName;

    /// Run the stage against the current state
    ///
    /// All suspension points (connector and text-generation calls) resolve
    /// before this returns; no stage partially completes across executor
    /// steps.
    async fn run(&self, state: &WorkflowState) -> StageResult;
}
