//! Plan structures: activities, day plans, and the final itinerary

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::place::PlaceRecord;
use super::weather::ForecastDay;

/// Activity category, used for duration defaults and indoor/outdoor handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Museum,
    Gallery,
    Park,
    Sightseeing,
    Dining,
    Shopping,
}

impl ActivityCategory {
    /// Typical duration for this kind of activity, in minutes
    pub fn default_duration_minutes(&self) -> u32 {
        match self {
            Self::Museum => 120,
            Self::Gallery => 90,
            Self::Park => 90,
            Self::Sightseeing => 60,
            Self::Dining => 90,
            Self::Shopping => 120,
        }
    }

    /// Whether this category takes place indoors
    pub fn is_indoor(&self) -> bool {
        matches!(self, Self::Museum | Self::Gallery | Self::Dining | Self::Shopping)
    }

    /// Classify a place's source category tag
    pub fn from_place_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains("museum") {
            Self::Museum
        } else if tag.contains("gallery") {
            Self::Gallery
        } else if tag.contains("park") || tag.contains("zoo") {
            Self::Park
        } else if tag.contains("restaurant") || tag.contains("cafe") {
            Self::Dining
        } else if tag.contains("shopping") || tag.contains("store") {
            Self::Shopping
        } else {
            Self::Sightseeing
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Museum => write!(f, "museum"),
            Self::Gallery => write!(f, "gallery"),
            Self::Park => write!(f, "park"),
            Self::Sightseeing => write!(f, "sightseeing"),
            Self::Dining => write!(f, "dining"),
            Self::Shopping => write!(f, "shopping"),
        }
    }
}

/// One scheduled activity within a day plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanActivity {
    pub name: String,
    pub category: ActivityCategory,

    /// Priority: 1 is must-do, larger values are more expendable
    pub priority: u8,

    /// Clock start time
    pub start: NaiveTime,

    pub duration_minutes: u32,

    /// Estimated cost per traveler, if known
    pub cost: Option<f64>,

    /// True when bad weather degrades the activity
    pub weather_sensitive: bool,

    pub indoor: bool,
}

impl PlanActivity {
    /// Create an activity with category defaults for duration and flags
    pub fn new(name: impl Into<String>, category: ActivityCategory, start: NaiveTime) -> Self {
        Self {
            name: name.into(),
            category,
            priority: 2,
            start,
            duration_minutes: category.default_duration_minutes(),
            cost: None,
            weather_sensitive: !category.is_indoor(),
            indoor: category.is_indoor(),
        }
    }

    /// Derived end time (start + duration)
    pub fn end(&self) -> NaiveTime {
        self.start + Duration::minutes(self.duration_minutes as i64)
    }

    /// Whether this activity overlaps another on the same day
    pub fn overlaps(&self, other: &PlanActivity) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Plan for a single day of the trip
///
/// Activities are kept ordered by start time; `insert` re-sorts on every
/// insertion so consumers can rely on chronological iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,

    /// Forecast for this date, if the weather source covered it
    pub forecast: Option<ForecastDay>,

    pub activities: Vec<PlanActivity>,
}

impl DayPlan {
    pub fn new(date: NaiveDate, forecast: Option<ForecastDay>) -> Self {
        Self {
            date,
            forecast,
            activities: Vec::new(),
        }
    }

    /// Insert an activity, maintaining start-time order
    pub fn insert(&mut self, activity: PlanActivity) {
        self.activities.push(activity);
        self.activities.sort_by_key(|a| a.start);
    }

    /// Total estimated cost of activities with a known cost
    pub fn estimated_cost(&self) -> f64 {
        self.activities.iter().filter_map(|a| a.cost).sum()
    }
}

/// The assembled result of a successful planning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelItinerary {
    pub destination: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration: i64,

    pub hotels: Vec<PlaceRecord>,
    pub attractions: Vec<PlaceRecord>,
    pub restaurants: Vec<PlaceRecord>,
    pub forecast: Vec<ForecastDay>,

    pub day_plans: Vec<DayPlan>,

    pub total_estimated_cost: Option<f64>,
    pub recommendations: Vec<String>,

    pub created_at: DateTime<Utc>,
}
