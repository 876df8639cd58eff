//! Weather connector: forecast interface + Google Weather implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use super::error::ConnectorError;
use super::http::HttpConnector;
use crate::config::ConnectorConfig;
use crate::domain::ForecastDay;

/// Source-imposed ceiling on forecast length in days
pub const MAX_FORECAST_DAYS: usize = 10;

/// Forecast interface consumed by the data-collection fan-out
///
/// Same timeout/idempotence contract as the places source. The returned day
/// count is bounded by `MAX_FORECAST_DAYS` regardless of the requested range.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the daily forecast for a location over a date range
    async fn forecast(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastDay>, ConnectorError>;
}

/// Google Weather API connector
pub struct GoogleWeatherConnector {
    http: HttpConnector,
}

impl GoogleWeatherConnector {
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            http: HttpConnector::from_config("weather", config)?,
        })
    }

    fn parse_day(value: &serde_json::Value) -> Option<ForecastDay> {
        let date = value["date"].as_str()?.parse().ok()?;
        Some(ForecastDay {
            date,
            temp_high: value["maxTemperature"]["degrees"].as_f64()?,
            temp_low: value["minTemperature"]["degrees"].as_f64()?,
            condition: value["condition"]["description"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
            humidity: value["relativeHumidity"].as_u64().unwrap_or(0).min(100) as u8,
            wind_speed: value["wind"]["speed"].as_f64().unwrap_or(0.0),
            precipitation_chance: value["precipitation"]["probability"].as_u64().unwrap_or(0).min(100) as u8,
        })
    }
}

#[async_trait]
impl WeatherSource for GoogleWeatherConnector {
    async fn forecast(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastDay>, ConnectorError> {
        debug!(location, %start, %end, "forecast: called");

        let requested = (end - start).num_days().max(0) as usize;
        let days = requested.min(MAX_FORECAST_DAYS);

        let body = self
            .http
            .get_json(
                "https://weather.googleapis.com/v1/forecast/days:lookup",
                &[("location", location.to_string()), ("days", days.to_string())],
            )
            .await?;

        let forecast_days = body["forecastDays"].as_array().cloned().unwrap_or_default();

        let mut result: Vec<ForecastDay> = forecast_days.iter().filter_map(Self::parse_day).collect();

        // Keep only days within the trip range
        result.retain(|d| d.date >= start && d.date < end);
        result.truncate(MAX_FORECAST_DAYS);

        debug!(count = result.len(), "forecast: complete");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        let value = serde_json::json!({
            "date": "2024-09-15",
            "maxTemperature": { "degrees": 24.5 },
            "minTemperature": { "degrees": 14.0 },
            "condition": { "description": "Partly cloudy" },
            "relativeHumidity": 60,
            "wind": { "speed": 11.0 },
            "precipitation": { "probability": 20 }
        });

        let day = GoogleWeatherConnector::parse_day(&value).unwrap();
        assert_eq!(day.date, "2024-09-15".parse::<NaiveDate>().unwrap());
        assert_eq!(day.temp_high, 24.5);
        assert_eq!(day.condition, "Partly cloudy");
        assert_eq!(day.precipitation_chance, 20);
    }

    #[test]
    fn test_parse_day_missing_temperature_rejected() {
        let value = serde_json::json!({ "date": "2024-09-15" });
        assert!(GoogleWeatherConnector::parse_day(&value).is_none());
    }

    #[test]
    fn test_parse_day_clamps_percentages() {
        let value = serde_json::json!({
            "date": "2024-09-15",
            "maxTemperature": { "degrees": 24.5 },
            "minTemperature": { "degrees": 14.0 },
            "relativeHumidity": 140,
            "precipitation": { "probability": 250 }
        });

        let day = GoogleWeatherConnector::parse_day(&value).unwrap();
        assert_eq!(day.humidity, 100);
        assert_eq!(day.precipitation_chance, 100);
    }
}
