//! Upstream services domain.
//!
//! Every third-party service the server depends on sits behind a small async
//! trait so the itinerary planner can be exercised with in-memory fakes:
//!
//! - [`Geocoder`]: free-text city name to coordinates (Nominatim)
//! - [`WeatherProvider`]: current conditions (Open-Meteo)
//! - [`PlacesSource`]: nearby points of interest (Overpass)
//! - [`TextGenerator`]: generative-text model (Gemini)
//!
//! Each call is a single attempt; failures propagate as [`ToolError`]s.
//!
//! [`ToolError`]: crate::domains::tools::ToolError

mod gemini;
mod geocode;
mod http;
pub mod places;
pub mod random;
#[cfg(test)]
pub(crate) mod testing;
mod weather;

use async_trait::async_trait;

use crate::domains::itinerary::{GeoPoint, PlaceCandidate, WeatherObservation};
use crate::domains::tools::ToolResult;

pub use gemini::GeminiClient;
pub use geocode::NominatimGeocoder;
pub use http::HttpClient;
pub use places::OverpassPlaces;
pub use random::{RandomSource, ThreadRandom};
pub use weather::{OpenMeteoWeather, describe_weather_code};

/// Resolves a place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `city`, or `None` when the service knows no such place.
    async fn geocode(&self, city: &str) -> ToolResult<Option<GeoPoint>>;
}

/// Reports current weather at a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, lat: f64, lon: f64) -> ToolResult<WeatherObservation>;
}

/// Finds date-worthy places near a location.
#[async_trait]
pub trait PlacesSource: Send + Sync {
    async fn find_places(
        &self,
        lat: f64,
        lon: f64,
        preferences: Option<&str>,
        spin: bool,
    ) -> ToolResult<Vec<PlaceCandidate>>;
}

/// Produces free text from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> ToolResult<String>;
}
