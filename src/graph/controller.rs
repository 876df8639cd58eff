//! Routing decisions for the planning graph's conditional edges

use tracing::{debug, info};

use super::executor::{DecideFn, Target};
use super::state::{StageName, WorkflowState};

/// Post-insight routing: build the plan when any places arrived, otherwise
/// take the insufficient-data branch
///
/// Evaluated after Research and LocalInsight so the insight stages run on
/// every path. Weather is deliberately not part of the sufficiency test; a
/// plan without a forecast is degraded, not impossible.
pub fn route_on_data() -> DecideFn {
    Box::new(|state: &mut WorkflowState| {
        if state.has_sufficient_data() {
            debug!(places = state.place_count(), "router: data sufficient, building plan");
            Target::Stage(StageName::PlanBuild)
        } else {
            info!("router: no places collected, routing to insufficient-data");
            Target::Stage(StageName::InsufficientData)
        }
    })
}

/// Post-critique routing: loop back through the optimizer while feedback is
/// actionable and rounds remain
///
/// Decision order: feedback without actionable issues finalizes; an
/// exhausted round budget finalizes regardless of issues; otherwise one
/// round is consumed at the moment the back-edge is chosen.
pub fn optimize_again(max_rounds: u32) -> DecideFn {
    Box::new(move |state: &mut WorkflowState| {
        let actionable = state.latest_feedback().is_some_and(|f| f.actionable());

        if !actionable {
            debug!("router: critique found nothing actionable, finalizing");
            return Target::Stage(StageName::Finalization);
        }
        if state.optimization_rounds >= max_rounds {
            info!(
                rounds = state.optimization_rounds,
                max_rounds, "router: optimization budget exhausted, finalizing"
            );
            return Target::Stage(StageName::Finalization);
        }

        state.optimization_rounds += 1;
        info!(round = state.optimization_rounds, max_rounds, "router: taking optimization loop");
        Target::Stage(StageName::Optimize)
    })
}
