//! Place records returned by the places connector

use serde::{Deserialize, Serialize};

/// Search category for the places connector
///
/// One fan-out query is issued per category during data collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    Hotel,
    Restaurant,
    Attraction,
}

impl PlaceCategory {
    /// The upstream search type string for this category
    pub fn query_type(&self) -> &'static str {
        match self {
            Self::Hotel => "lodging",
            Self::Restaurant => "restaurant",
            Self::Attraction => "tourist_attraction",
        }
    }

    /// All categories queried during fan-out
    pub fn all() -> [PlaceCategory; 3] {
        [Self::Hotel, Self::Restaurant, Self::Attraction]
    }
}

impl std::fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hotel => write!(f, "hotel"),
            Self::Restaurant => write!(f, "restaurant"),
            Self::Attraction => write!(f, "attraction"),
        }
    }
}

/// A place returned by the external search source
///
/// Identity is the `id` field only; records are immutable once fetched and
/// deduplicated by id when merged into workflow state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Source-assigned identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Rating in [0, 5]
    pub rating: f64,

    /// Price tier in [0, 4]
    pub price_level: u8,

    /// Source category tag (e.g. "museum", "park")
    pub category: String,

    /// Street address
    pub address: String,
}

impl PlaceRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: 0.0,
            price_level: 0,
            category: String::new(),
            address: String::new(),
        }
    }

    /// Whether the tagged category describes an indoor venue
    pub fn is_indoor(&self) -> bool {
        let cat = self.category.to_lowercase();
        cat.contains("museum") || cat.contains("gallery") || cat.contains("restaurant") || cat.contains("lodging")
    }

    /// Whether this place matches any of the given interest tags
    pub fn matches_interests(&self, interests: &[String]) -> bool {
        let haystack = format!("{} {}", self.name.to_lowercase(), self.category.to_lowercase());
        interests.iter().any(|i| {
            let tag = i.to_lowercase();
            // "museums" should match a "museum" category tag
            let singular = tag.strip_suffix('s').unwrap_or(&tag);
            haystack.contains(singular)
        })
    }
}
