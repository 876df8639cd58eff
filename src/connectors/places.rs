//! Places connector: search interface + Google Places implementation

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::ConnectorError;
use super::http::HttpConnector;
use crate::config::ConnectorConfig;
use crate::domain::{PlaceCategory, PlaceRecord};

/// Maximum places returned per category
const MAX_PLACES: usize = 10;

/// Search interface consumed by the data-collection fan-out
///
/// Idempotent and side-effect-free from the caller's perspective. Results
/// come back in the source's native order; no ranking is applied here.
#[async_trait]
pub trait PlacesSource: Send + Sync {
    /// Search for places of one category around a location
    async fn search(
        &self,
        location: &str,
        category: PlaceCategory,
        radius_m: u32,
    ) -> Result<Vec<PlaceRecord>, ConnectorError>;
}

/// Google Places API connector
///
/// Geocodes the location once (cached per connector instance), then issues
/// nearby searches per category.
pub struct GooglePlacesConnector {
    http: HttpConnector,
    geocode_cache: Mutex<Option<(String, f64, f64)>>,
}

impl GooglePlacesConnector {
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            http: HttpConnector::from_config("places", config)?,
            geocode_cache: Mutex::new(None),
        })
    }

    /// Resolve a location string to coordinates, caching the last result
    async fn geocode(&self, location: &str) -> Result<(f64, f64), ConnectorError> {
        {
            let cache = self.geocode_cache.lock().await;
            if let Some((cached_loc, lat, lng)) = cache.as_ref()
                && cached_loc == location
            {
                debug!(location, "geocode: cache hit");
                return Ok((*lat, *lng));
            }
        }

        let body = self
            .http
            .get_json(
                "https://maps.googleapis.com/maps/api/geocode/json",
                &[("address", location.to_string())],
            )
            .await?;

        let result = body["results"]
            .get(0)
            .and_then(|r| r["geometry"]["location"].as_object())
            .and_then(|loc| Some((loc.get("lat")?.as_f64()?, loc.get("lng")?.as_f64()?)))
            .ok_or_else(|| ConnectorError::LocationNotFound(location.to_string()))?;

        let mut cache = self.geocode_cache.lock().await;
        *cache = Some((location.to_string(), result.0, result.1));
        Ok(result)
    }

    fn parse_place(value: &serde_json::Value) -> Option<PlaceRecord> {
        Some(PlaceRecord {
            id: value["place_id"].as_str()?.to_string(),
            name: value["name"].as_str()?.to_string(),
            rating: value["rating"].as_f64().unwrap_or(0.0).clamp(0.0, 5.0),
            price_level: value["price_level"].as_u64().unwrap_or(0).min(4) as u8,
            category: value["types"]
                .get(0)
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
            address: value["vicinity"].as_str().unwrap_or_default().to_string(),
        })
    }
}

#[async_trait]
impl PlacesSource for GooglePlacesConnector {
    async fn search(
        &self,
        location: &str,
        category: PlaceCategory,
        radius_m: u32,
    ) -> Result<Vec<PlaceRecord>, ConnectorError> {
        debug!(location, %category, radius_m, "search: called");

        let (lat, lng) = self.geocode(location).await?;

        let body = self
            .http
            .get_json(
                "https://maps.googleapis.com/maps/api/place/nearbysearch/json",
                &[
                    ("location", format!("{lat},{lng}")),
                    ("radius", radius_m.to_string()),
                    ("type", category.query_type().to_string()),
                ],
            )
            .await?;

        let status = body["status"].as_str().unwrap_or_default();
        if status != "OK" && status != "ZERO_RESULTS" {
            return Err(ConnectorError::InvalidResponse {
                service: "places",
                message: format!("search returned status {status}"),
            });
        }

        let results = body["results"].as_array().cloned().unwrap_or_default();
        let places: Vec<PlaceRecord> = results.iter().filter_map(Self::parse_place).take(MAX_PLACES).collect();

        debug!(%category, count = places.len(), "search: complete");
        Ok(places)
    }
}
