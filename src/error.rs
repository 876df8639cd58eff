//! Top-level error taxonomy for planning runs
//!
//! Connector and LLM failures have their own module-level error enums; by the
//! time a run finishes they have been folded into the state's error messages.
//! `PlannerError` is what the caller sees and distinguishes the three
//! user-visible failure shapes: invalid request, stopped early on
//! insufficient data, and workflow failure.

use thiserror::Error;

/// How many trailing error messages to surface to the caller
const ERROR_TAIL: usize = 3;

/// Errors surfaced to the caller of a planning run
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The request was malformed or out of range; nothing was executed
    #[error("invalid request: {0}")]
    Validation(String),

    /// The run stopped early because required external data was missing
    #[error("insufficient data: {}", messages.join("; "))]
    InsufficientData { messages: Vec<String> },

    /// The run reached the terminal marker without producing a result
    #[error("workflow failed: {}", messages.join("; "))]
    Workflow { messages: Vec<String> },
}

impl PlannerError {
    /// Build an error carrying the tail of the accumulated messages
    pub fn workflow_from(messages: &[String]) -> Self {
        Self::Workflow {
            messages: tail(messages),
        }
    }

    /// Build an insufficient-data error carrying the tail of the messages
    pub fn insufficient_from(messages: &[String]) -> Self {
        Self::InsufficientData {
            messages: tail(messages),
        }
    }
}

fn tail(messages: &[String]) -> Vec<String> {
    let start = messages.len().saturating_sub(ERROR_TAIL);
    messages[start..].to_vec()
}
