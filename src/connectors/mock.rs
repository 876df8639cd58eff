//! Mock connectors for tests
//!
//! Both mocks count invocations so tests can assert that no connector calls
//! happen on validation failures.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};

use super::error::ConnectorError;
use super::places::PlacesSource;
use super::weather::{MAX_FORECAST_DAYS, WeatherSource};
use crate::domain::{ForecastDay, PlaceCategory, PlaceRecord};

/// Mock places source with canned per-category results
pub struct MockPlaces {
    results: Mutex<HashMap<PlaceCategory, Result<Vec<PlaceRecord>, String>>>,
    calls: AtomicUsize,
}

impl MockPlaces {
    /// Create a mock with empty results for every category
    pub fn empty() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock with `count` generated places per category
    pub fn with_sample_data(count: usize) -> Self {
        let mock = Self::empty();
        for category in PlaceCategory::all() {
            mock.set(category, sample_places(category, count));
        }
        mock
    }

    /// Set the result for one category
    pub fn set(&self, category: PlaceCategory, places: Vec<PlaceRecord>) {
        if let Ok(mut results) = self.results.lock() {
            results.insert(category, Ok(places));
        }
    }

    /// Make one category fail with an error message
    pub fn fail(&self, category: PlaceCategory, message: impl Into<String>) {
        if let Ok(mut results) = self.results.lock() {
            results.insert(category, Err(message.into()));
        }
    }

    /// Number of search calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesSource for MockPlaces {
    async fn search(
        &self,
        _location: &str,
        category: PlaceCategory,
        _radius_m: u32,
    ) -> Result<Vec<PlaceRecord>, ConnectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let entry = self.results.lock().ok().and_then(|r| r.get(&category).cloned());
        match entry {
            Some(Ok(places)) => Ok(places),
            Some(Err(message)) => Err(ConnectorError::ApiError {
                service: "places",
                status: 503,
                message,
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Mock weather source
pub struct MockWeather {
    fail_with_timeout: Mutex<bool>,
    condition: Mutex<String>,
    precipitation: Mutex<u8>,
    calls: AtomicUsize,
}

impl MockWeather {
    /// Create a mock returning pleasant weather for the whole range
    pub fn sunny() -> Self {
        Self {
            fail_with_timeout: Mutex::new(false),
            condition: Mutex::new("Sunny".to_string()),
            precipitation: Mutex::new(10),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock returning rainy weather (high precipitation chance)
    pub fn rainy() -> Self {
        let mock = Self::sunny();
        if let (Ok(mut cond), Ok(mut precip)) = (mock.condition.lock(), mock.precipitation.lock()) {
            *cond = "Heavy rain".to_string();
            *precip = 80;
        }
        mock
    }

    /// Make every forecast call time out
    pub fn timing_out() -> Self {
        let mock = Self::sunny();
        if let Ok(mut fail) = mock.fail_with_timeout.lock() {
            *fail = true;
        }
        mock
    }

    /// Number of forecast calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for MockWeather {
    async fn forecast(
        &self,
        _location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastDay>, ConnectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_with_timeout.lock().map(|f| *f).unwrap_or(false) {
            return Err(ConnectorError::Timeout(Duration::from_secs(30)));
        }

        let condition = self.condition.lock().map(|c| c.clone()).unwrap_or_default();
        let precipitation = self.precipitation.lock().map(|p| *p).unwrap_or(0);

        let days = (end - start).num_days().max(0) as usize;
        let forecast = (0..days.min(MAX_FORECAST_DAYS))
            .map(|i| ForecastDay {
                date: start + ChronoDuration::days(i as i64),
                temp_high: 22.0,
                temp_low: 14.0,
                condition: condition.clone(),
                humidity: 60,
                wind_speed: 10.0,
                precipitation_chance: precipitation,
            })
            .collect();

        Ok(forecast)
    }
}

/// Generate deterministic sample places for a category
pub fn sample_places(category: PlaceCategory, count: usize) -> Vec<PlaceRecord> {
    (0..count)
        .map(|i| {
            let tag = match category {
                PlaceCategory::Hotel => "lodging",
                PlaceCategory::Restaurant => "restaurant",
                // Alternate indoor/outdoor attraction types
                PlaceCategory::Attraction if i % 2 == 0 => "museum",
                PlaceCategory::Attraction => "park",
            };
            PlaceRecord {
                id: format!("{category}-{i}"),
                name: format!("Sample {category} {i}"),
                rating: 4.5 - (i as f64) * 0.1,
                price_level: 2,
                category: tag.to_string(),
                address: format!("{i} Example Street"),
            }
        })
        .collect()
}
