//! Directed-graph stage executor
//!
//! Stages are nodes; edges are either unconditional or a decision function
//! evaluated against the state after the source stage ran. The graph is
//! validated at build time: every edge target must name a registered stage,
//! every registered stage must be reachable from the entry point, and every
//! stage must have an outgoing edge. Execution is single-threaded over
//! stages (concurrency lives inside stages), applies each stage's update
//! before routing, and carries a step limit as a backstop against a
//! miswired cycle.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use super::stages::{Outcome, Stage};
use super::state::{StageName, WorkflowState};

/// Where an edge points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stage(StageName),
    /// Terminal marker: the run ends
    End,
}

/// Decision function for a conditional edge
///
/// Takes the state mutably so routing decisions that consume budget (the
/// optimization-round counter) update it at the moment the edge is chosen.
pub type DecideFn = Box<dyn Fn(&mut WorkflowState) -> Target + Send + Sync>;

enum Edge {
    Unconditional(Target),
    Conditional(DecideFn),
}

/// Graph construction or wiring error
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate stage: {0}")]
    DuplicateStage(StageName),
    #[error("edge from unregistered stage: {0}")]
    EdgeFromUnknown(StageName),
    #[error("edge from {from} targets unregistered stage: {to}")]
    DanglingTarget { from: StageName, to: StageName },
    #[error("stage {0} has no outgoing edge")]
    NoOutgoingEdge(StageName),
    #[error("stage {0} is unreachable from the entry point")]
    Unreachable(StageName),
    #[error("step limit of {0} exceeded; a cycle is not terminating")]
    StepLimitExceeded(usize),
}

/// Builder for a validated workflow graph
pub struct GraphBuilder {
    entry: StageName,
    stages: HashMap<StageName, Box<dyn Stage>>,
    edges: HashMap<StageName, Edge>,
    // Conditional edges declare their possible targets for validation
    declared_targets: Vec<(StageName, Target)>,
}

impl GraphBuilder {
    pub fn new(entry: StageName) -> Self {
        Self {
            entry,
            stages: HashMap::new(),
            edges: HashMap::new(),
            declared_targets: Vec::new(),
        }
    }

    /// Register a stage node
    pub fn stage(mut self, stage: Box<dyn Stage>) -> Result<Self, GraphError> {
        let name = stage.name();
        if self.stages.insert(name, stage).is_some() {
            return Err(GraphError::DuplicateStage(name));
        }
        Ok(self)
    }

    /// Add an unconditional edge
    pub fn edge(mut self, from: StageName, to: Target) -> Self {
        self.declared_targets.push((from, to));
        self.edges.insert(from, Edge::Unconditional(to));
        self
    }

    /// Add a conditional edge with its declared possible targets
    pub fn conditional_edge(mut self, from: StageName, targets: &[Target], decide: DecideFn) -> Self {
        for target in targets {
            self.declared_targets.push((from, *target));
        }
        self.edges.insert(from, Edge::Conditional(decide));
        self
    }

    /// Validate the wiring and produce an executable graph
    pub fn build(self) -> Result<WorkflowGraph, GraphError> {
        for (from, target) in &self.declared_targets {
            if !self.stages.contains_key(from) {
                return Err(GraphError::EdgeFromUnknown(*from));
            }
            if let Target::Stage(to) = target
                && !self.stages.contains_key(to)
            {
                return Err(GraphError::DanglingTarget { from: *from, to: *to });
            }
        }

        for name in self.stages.keys() {
            if !self.edges.contains_key(name) {
                return Err(GraphError::NoOutgoingEdge(*name));
            }
        }

        // Reachability over declared targets
        let mut reachable = vec![self.entry];
        let mut frontier = vec![self.entry];
        while let Some(current) = frontier.pop() {
            for (from, target) in &self.declared_targets {
                if *from == current
                    && let Target::Stage(to) = target
                    && !reachable.contains(to)
                {
                    reachable.push(*to);
                    frontier.push(*to);
                }
            }
        }
        for name in self.stages.keys() {
            if !reachable.contains(name) {
                return Err(GraphError::Unreachable(*name));
            }
        }

        Ok(WorkflowGraph {
            entry: self.entry,
            stages: self.stages,
            edges: self.edges,
        })
    }
}

/// A validated, executable stage graph
pub struct WorkflowGraph {
    entry: StageName,
    stages: HashMap<StageName, Box<dyn Stage>>,
    edges: HashMap<StageName, Edge>,
}

/// Backstop on total stage executions per run
///
/// The real bound is the optimization-round cap; this only catches a
/// miswired graph during development.
const MAX_STEPS: usize = 64;

impl WorkflowGraph {
    /// Execute the graph to completion, mutating the state in place
    pub async fn run(&self, state: &mut WorkflowState) -> Result<(), GraphError> {
        let mut current = self.entry;
        let mut steps = 0;

        loop {
            steps += 1;
            if steps > MAX_STEPS {
                return Err(GraphError::StepLimitExceeded(MAX_STEPS));
            }

            // Registration is validated at build time
            let stage = self
                .stages
                .get(&current)
                .ok_or(GraphError::EdgeFromUnknown(current))?;

            debug!(stage = %current, step = steps, "executor: running stage");
            let result = stage.run(state).await;
            state.apply(result.update);

            if result.outcome == Outcome::Fatal {
                info!(stage = %current, "executor: fatal outcome, ending run");
                return Ok(());
            }

            let target = match self.edges.get(&current) {
                Some(Edge::Unconditional(target)) => *target,
                Some(Edge::Conditional(decide)) => decide(state),
                None => return Err(GraphError::NoOutgoingEdge(current)),
            };

            match target {
                Target::Stage(next) => {
                    debug!(from = %current, to = %next, "executor: routing");
                    current = next;
                }
                Target::End => {
                    info!(steps, "executor: run complete");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TravelRequest;
    use crate::graph::stages::{StageResult, IntakeStage};
    use crate::graph::state::StateUpdate;
    use async_trait::async_trait;

    struct Marker(StageName);

    #[async_trait]
    impl Stage for Marker {
        fn name(&self) -> StageName {
            self.0
        }

        async fn run(&self, _state: &WorkflowState) -> StageResult {
            StageResult::advance(StateUpdate::entering(self.0).completed(self.0))
        }
    }

    fn state() -> WorkflowState {
        WorkflowState::new(TravelRequest::new(
            "Paris, France",
            "2024-09-15".parse().unwrap(),
            "2024-09-19".parse().unwrap(),
        ))
    }

    #[test]
    fn test_dangling_target_rejected() {
        let result = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(IntakeStage))
            .unwrap()
            .edge(StageName::Intake, Target::Stage(StageName::Research))
            .build();

        assert!(matches!(result, Err(GraphError::DanglingTarget { .. })));
    }

    #[test]
    fn test_unreachable_stage_rejected() {
        let result = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(IntakeStage))
            .unwrap()
            .stage(Box::new(Marker(StageName::Research)))
            .unwrap()
            .edge(StageName::Intake, Target::End)
            .edge(StageName::Research, Target::End)
            .build();

        assert!(matches!(result, Err(GraphError::Unreachable(StageName::Research))));
    }

    #[test]
    fn test_missing_outgoing_edge_rejected() {
        let result = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(IntakeStage))
            .unwrap()
            .build();

        assert!(matches!(result, Err(GraphError::NoOutgoingEdge(StageName::Intake))));
    }

    #[tokio::test]
    async fn test_linear_run_applies_updates_in_order() {
        let graph = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(Marker(StageName::Intake)))
            .unwrap()
            .stage(Box::new(Marker(StageName::Research)))
            .unwrap()
            .edge(StageName::Intake, Target::Stage(StageName::Research))
            .edge(StageName::Research, Target::End)
            .build()
            .unwrap();

        let mut s = state();
        graph.run(&mut s).await.unwrap();

        assert_eq!(s.completed_stages, vec![StageName::Intake, StageName::Research]);
        assert_eq!(s.current_stage, Some(StageName::Research));
    }

    #[tokio::test]
    async fn test_conditional_edge_routes_on_state() {
        let graph = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(Marker(StageName::Intake)))
            .unwrap()
            .stage(Box::new(Marker(StageName::Research)))
            .unwrap()
            .stage(Box::new(Marker(StageName::InsufficientData)))
            .unwrap()
            .conditional_edge(
                StageName::Intake,
                &[
                    Target::Stage(StageName::Research),
                    Target::Stage(StageName::InsufficientData),
                ],
                Box::new(|state: &mut WorkflowState| {
                    if state.has_sufficient_data() {
                        Target::Stage(StageName::Research)
                    } else {
                        Target::Stage(StageName::InsufficientData)
                    }
                }),
            )
            .edge(StageName::Research, Target::End)
            .edge(StageName::InsufficientData, Target::End)
            .build()
            .unwrap();

        let mut s = state();
        graph.run(&mut s).await.unwrap();
        assert!(s.completed_stages.contains(&StageName::InsufficientData));
        assert!(!s.completed_stages.contains(&StageName::Research));
    }

    #[tokio::test]
    async fn test_cycle_without_exit_hits_step_limit() {
        let graph = GraphBuilder::new(StageName::PlanBuild)
            .stage(Box::new(Marker(StageName::PlanBuild)))
            .unwrap()
            .stage(Box::new(Marker(StageName::Critique)))
            .unwrap()
            .edge(StageName::PlanBuild, Target::Stage(StageName::Critique))
            .edge(StageName::Critique, Target::Stage(StageName::PlanBuild))
            .build()
            .unwrap();

        let mut s = state();
        let result = graph.run(&mut s).await;
        assert!(matches!(result, Err(GraphError::StepLimitExceeded(_))));
    }

    #[tokio::test]
    async fn test_fatal_outcome_ends_run() {
        struct Failing;

        #[async_trait]
        impl Stage for Failing {
            fn name(&self) -> StageName {
                StageName::Intake
            }

            async fn run(&self, _state: &WorkflowState) -> StageResult {
                StageResult::abort(StateUpdate::entering(StageName::Intake).failed(StageName::Intake, "bad input"))
            }
        }

        let graph = GraphBuilder::new(StageName::Intake)
            .stage(Box::new(Failing))
            .unwrap()
            .stage(Box::new(Marker(StageName::Research)))
            .unwrap()
            .edge(StageName::Intake, Target::Stage(StageName::Research))
            .edge(StageName::Research, Target::End)
            .build()
            .unwrap();

        let mut s = state();
        graph.run(&mut s).await.unwrap();
        assert!(s.failed_stages.contains(&StageName::Intake));
        assert!(!s.completed_stages.contains(&StageName::Research));
    }
}
