//! The planning workflow graph: state, stages, routing, and execution

pub mod collect;
pub mod controller;
pub mod executor;
pub mod stages;
pub mod state;

pub use executor::{DecideFn, GraphBuilder, GraphError, Target, WorkflowGraph};
pub use state::{StageName, StateUpdate, WorkflowState};
