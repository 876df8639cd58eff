//! Data-collection stage: wraps the connector fan-out

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{Stage, StageResult};
use crate::connectors::{PlacesSource, WeatherSource};
use crate::graph::collect::collect_travel_data;
use crate::graph::state::{StageName, StateUpdate, WorkflowState};

/// Fans out to the external search and forecast sources
///
/// Non-fatal: partial data is recorded as-is. The stage is marked failed
/// when any source failed, completed when all four succeeded; downstream
/// stages work with whatever arrived either way.
pub struct DataCollectionStage {
    places: Arc<dyn PlacesSource>,
    weather: Arc<dyn WeatherSource>,
    radius_m: u32,
}

impl DataCollectionStage {
    pub fn new(places: Arc<dyn PlacesSource>, weather: Arc<dyn WeatherSource>, radius_m: u32) -> Self {
        Self {
            places,
            weather,
            radius_m,
        }
    }
}

#[async_trait]
impl Stage for DataCollectionStage {
    fn name(&self) -> StageName {
        StageName::DataCollection
    }

    async fn run(&self, state: &WorkflowState) -> StageResult {
        let collected = collect_travel_data(&self.places, &self.weather, &state.request, self.radius_m).await;

        let any_failed = !collected.error_messages.is_empty();
        let mut update = StateUpdate::entering(self.name()).merge(collected);

        info!(
            hotels = update.hotels.len(),
            restaurants = update.restaurants.len(),
            attractions = update.attractions.len(),
            forecast_days = update.forecast_days.len(),
            degraded = any_failed,
            "data_collection: complete"
        );

        if any_failed {
            update.failed_stages.push(self.name());
        } else {
            update.completed_stages.push(self.name());
        }

        StageResult::advance(update)
    }
}
