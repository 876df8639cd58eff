//! External data-source connectors
//!
//! The connector layer owns everything the workflow core treats as an
//! external collaborator: per-call timeouts, bounded retries with
//! exponential backoff, and minimum inter-request spacing. A connector that
//! exhausts its retries returns an error; it is the calling stage's job to
//! degrade that into an empty result plus an error-message entry.

mod error;
mod http;
mod places;
mod weather;

pub mod mock;

pub use error::ConnectorError;
pub use http::HttpConnector;
pub use places::{GooglePlacesConnector, PlacesSource};
pub use weather::{GoogleWeatherConnector, WeatherSource};
