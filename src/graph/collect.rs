//! Data-collection fan-out
//!
//! Issues the three category searches and the forecast lookup concurrently
//! and folds the results into one partial update. Each source is isolated:
//! a failure yields an empty result for that category plus one error-message
//! entry, and never cancels or blocks the other sources. All four operations
//! are awaited before the combined update is returned.

use std::sync::Arc;

use tracing::{debug, warn};

use super::state::{StageName, StateUpdate};
use crate::connectors::{PlacesSource, WeatherSource};
use crate::domain::{PlaceCategory, TravelRequest};

/// Run the fan-out and return one combined partial update
///
/// Category lists keep the source's native order; no ranking happens here.
pub async fn collect_travel_data(
    places: &Arc<dyn PlacesSource>,
    weather: &Arc<dyn WeatherSource>,
    request: &TravelRequest,
    radius_m: u32,
) -> StateUpdate {
    let location = request.destination.as_str();
    debug!(location, "collect_travel_data: starting fan-out");

    let (hotels, restaurants, attractions, forecast) = tokio::join!(
        places.search(location, PlaceCategory::Hotel, radius_m),
        places.search(location, PlaceCategory::Restaurant, radius_m),
        places.search(location, PlaceCategory::Attraction, radius_m),
        weather.forecast(location, request.start, request.end),
    );

    let mut update = StateUpdate::default();

    match hotels {
        Ok(records) => update.hotels = records,
        Err(e) => {
            warn!(error = %e, "collect_travel_data: hotel search failed");
            update = update.noting(StageName::DataCollection, format!("hotel search failed: {e}"));
        }
    }

    match restaurants {
        Ok(records) => update.restaurants = records,
        Err(e) => {
            warn!(error = %e, "collect_travel_data: restaurant search failed");
            update = update.noting(StageName::DataCollection, format!("restaurant search failed: {e}"));
        }
    }

    match attractions {
        Ok(records) => update.attractions = records,
        Err(e) => {
            warn!(error = %e, "collect_travel_data: attraction search failed");
            update = update.noting(StageName::DataCollection, format!("attraction search failed: {e}"));
        }
    }

    match forecast {
        Ok(days) => update.forecast_days = days,
        Err(e) => {
            warn!(error = %e, "collect_travel_data: weather forecast failed");
            update = update.noting(StageName::DataCollection, format!("weather forecast failed: {e}"));
        }
    }

    debug!(
        hotels = update.hotels.len(),
        restaurants = update.restaurants.len(),
        attractions = update.attractions.len(),
        forecast_days = update.forecast_days.len(),
        errors = update.error_messages.len(),
        "collect_travel_data: fan-out complete"
    );

    update
}
