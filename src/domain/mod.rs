//! Domain types for the travel planning pipeline
//!
//! Immutable value types that flow through the workflow: the validated
//! request, external data records (places, forecast days), and the plan
//! structures assembled by the later stages.

mod itinerary;
mod place;
mod request;
mod weather;

pub use itinerary::{ActivityCategory, DayPlan, PlanActivity, TravelItinerary};
pub use place::{PlaceCategory, PlaceRecord};
pub use request::TravelRequest;
pub use weather::ForecastDay;
