//! City geocoding via Nominatim.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Geocoder, HttpClient};
use crate::domains::itinerary::GeoPoint;
use crate::domains::tools::{ToolError, ToolResult};

const SERVICE: &str = "Nominatim";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim search client. Returns the best match only.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: HttpClient,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, city: &str) -> ToolResult<Option<GeoPoint>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let request = self
            .http
            .get(&url)
            .query(&[("city", city), ("format", "json"), ("limit", "1")]);

        let places: Vec<NominatimPlace> = self.http.send_json(SERVICE, request).await?;
        let Some(place) = places.into_iter().next() else {
            debug!("No geocoding match");
            return Ok(None);
        };

        let lat = place.lat.trim().parse::<f64>();
        let lon = place.lon.trim().parse::<f64>();
        match (lat, lon) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => {
                debug!(lat, lon, "Geocoded {}", place.display_name);
                Ok(Some(GeoPoint {
                    lat,
                    lon,
                    display_name: place.display_name,
                }))
            }
            _ => Err(ToolError::bad_gateway(format!(
                "{SERVICE} returned invalid coordinates: {}, {}",
                place.lat, place.lon
            ))),
        }
    }
}
