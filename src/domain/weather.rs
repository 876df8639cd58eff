//! Forecast data returned by the weather connector

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of forecast data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,

    /// High temperature in °C
    pub temp_high: f64,

    /// Low temperature in °C
    pub temp_low: f64,

    /// Textual condition (e.g. "Partly cloudy")
    pub condition: String,

    /// Relative humidity in [0, 100]
    pub humidity: u8,

    /// Wind speed in km/h
    pub wind_speed: f64,

    /// Precipitation probability in [0, 100]
    pub precipitation_chance: u8,
}

impl ForecastDay {
    /// Whether outdoor activities should be avoided on this day
    pub fn is_wet(&self) -> bool {
        self.precipitation_chance > 50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wet() {
        let mut day = ForecastDay {
            date: "2024-09-15".parse().unwrap(),
            temp_high: 22.0,
            temp_low: 15.0,
            condition: "Light rain".to_string(),
            humidity: 80,
            wind_speed: 12.0,
            precipitation_chance: 70,
        };
        assert!(day.is_wet());

        day.precipitation_chance = 20;
        assert!(!day.is_wet());
    }
}
