//! End-to-end workflow tests over mock connectors and a mock LLM

use std::sync::Arc;

use tripgraph::Planner;
use tripgraph::config::Config;
use tripgraph::connectors::mock::{MockPlaces, MockWeather};
use tripgraph::connectors::{PlacesSource, WeatherSource};
use tripgraph::domain::TravelRequest;
use tripgraph::error::PlannerError;
use tripgraph::graph::StageName;
use tripgraph::llm::client::mock::MockGenerateClient;

fn paris_request() -> TravelRequest {
    let mut request = TravelRequest::new(
        "Paris, France",
        "2024-09-15".parse().unwrap(),
        "2024-09-19".parse().unwrap(),
    );
    request.budget = Some(2000.0);
    request.interests = vec!["museums".to_string(), "food".to_string()];
    request
}

fn planner(places: &Arc<MockPlaces>, weather: &Arc<MockWeather>) -> Planner {
    Planner::new(
        Arc::clone(places) as Arc<dyn PlacesSource>,
        Arc::clone(weather) as Arc<dyn WeatherSource>,
        Arc::new(MockGenerateClient::always("A well-paced plan.")),
        &Config::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_happy_path_produces_full_itinerary() {
    let places = Arc::new(MockPlaces::with_sample_data(5));
    let weather = Arc::new(MockWeather::sunny());

    let state = planner(&places, &weather).execute(paris_request()).await.unwrap();

    assert!(state.failed_stages.is_empty(), "failed: {:?}", state.failed_stages);
    assert!(state.completed_stages.contains(&StageName::Finalization));
    assert_eq!(state.day_plans.len(), 4);

    let itinerary = state.final_result.expect("itinerary");
    assert_eq!(itinerary.duration, 4);
    assert_eq!(itinerary.day_plans.len(), 4);
    assert!(itinerary.day_plans.iter().all(|p| !p.activities.is_empty()));
    assert!(itinerary.total_estimated_cost.is_some());
    // Insight text flows through to recommendations
    assert!(!itinerary.recommendations.is_empty());
}

#[tokio::test]
async fn test_weather_timeout_degrades_but_completes() {
    let places = Arc::new(MockPlaces::with_sample_data(5));
    let weather = Arc::new(MockWeather::timing_out());

    let state = planner(&places, &weather).execute(paris_request()).await.unwrap();

    assert!(state.completed_stages.contains(&StageName::Finalization));
    assert!(state.forecast_days.is_empty());

    let weather_errors: Vec<_> = state.error_messages.iter().filter(|m| m.contains("weather")).collect();
    assert_eq!(weather_errors.len(), 1);

    let itinerary = state.final_result.expect("itinerary");
    assert_eq!(itinerary.day_plans.len(), 4);
    assert!(itinerary.day_plans.iter().all(|p| p.forecast.is_none()));
}

#[tokio::test]
async fn test_invalid_dates_abort_before_any_connector_call() {
    let places = Arc::new(MockPlaces::with_sample_data(5));
    let weather = Arc::new(MockWeather::sunny());

    let mut request = paris_request();
    request.end = request.start;

    let state = planner(&places, &weather).execute(request).await.unwrap();

    assert!(state.failed_stages.contains(&StageName::Intake));
    assert!(state.completed_stages.is_empty());
    assert_eq!(places.call_count(), 0);
    assert_eq!(weather.call_count(), 0);
}

#[tokio::test]
async fn test_validation_error_surface() {
    let places = Arc::new(MockPlaces::with_sample_data(5));
    let weather = Arc::new(MockWeather::sunny());

    let mut request = paris_request();
    request.destination = String::new();

    let err = planner(&places, &weather).run(request).await.unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));
}

#[tokio::test]
async fn test_no_places_routes_to_insufficient_data() {
    let places = Arc::new(MockPlaces::empty());
    let weather = Arc::new(MockWeather::sunny());

    let state = planner(&places, &weather).execute(paris_request()).await.unwrap();

    // The insight stages still run before the branch decides
    assert!(state.completed_stages.contains(&StageName::Research));
    assert!(state.completed_stages.contains(&StageName::LocalInsight));
    assert!(state.completed_stages.contains(&StageName::InsufficientData));
    assert!(!state.completed_stages.contains(&StageName::PlanBuild));
    assert!(state.day_plans.is_empty());
    assert!(state.final_result.is_none());

    let err = planner(&places, &weather).run(paris_request()).await.unwrap_err();
    assert!(matches!(err, PlannerError::InsufficientData { .. }));
}

#[tokio::test]
async fn test_rainy_trip_moves_outdoor_activities_inside() {
    let places = Arc::new(MockPlaces::with_sample_data(10));
    let weather = Arc::new(MockWeather::rainy());

    let mut request = paris_request();
    request.interests = Vec::new();

    let state = planner(&places, &weather).execute(request).await.unwrap();

    assert!(state.completed_stages.contains(&StageName::Optimize));
    assert_eq!(state.optimization_rounds, 1);

    let itinerary = state.final_result.expect("itinerary");
    for plan in &itinerary.day_plans {
        let wet = plan.forecast.as_ref().is_some_and(|f| f.is_wet());
        if wet {
            assert!(
                plan.activities.iter().all(|a| a.indoor || !a.weather_sensitive),
                "outdoor activity remains on wet day {}",
                plan.date
            );
        }
    }
}

#[tokio::test]
async fn test_repairable_budget_overrun_clears_before_round_cap() {
    let places = Arc::new(MockPlaces::with_sample_data(5));
    let weather = Arc::new(MockWeather::sunny());

    let mut request = paris_request();
    // Just over the 10% tolerance: dropping one costed activity clears it
    request.budget = Some(790.0);

    let state = planner(&places, &weather).execute(request).await.unwrap();

    assert_eq!(state.optimization_rounds, 1);
    assert_eq!(state.critique_rounds.len(), 2);
    assert!(!state.critique_rounds[0].issues.is_empty());
    assert!(state.critique_rounds[1].issues.is_empty());
    // The repair actually lowered the re-checked estimate
    assert!(state.critique_rounds[1].estimated_cost < state.critique_rounds[0].estimated_cost);
    assert!(state.final_result.is_some());
}

#[tokio::test]
async fn test_persistent_budget_overrun_respects_round_cap() {
    let places = Arc::new(MockPlaces::with_sample_data(5));
    let weather = Arc::new(MockWeather::sunny());

    let mut request = paris_request();
    // Far below the lodging-driven estimate, so every critique pass flags it
    request.budget = Some(100.0);

    let state = planner(&places, &weather).execute(request).await.unwrap();

    assert_eq!(state.optimization_rounds, 2);
    assert_eq!(state.critique_rounds.len(), 3);
    // The run still finishes with an itinerary despite the unresolved overrun
    assert!(state.completed_stages.contains(&StageName::Finalization));
    assert!(state.final_result.is_some());
}
