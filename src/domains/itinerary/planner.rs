//! Date planning pipeline.
//!
//! Resolve a location, then fetch weather, then nearby places, then ask the
//! model for a plan. Steps run strictly in that order and the first failure
//! ends the call.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use super::generator::ItineraryGenerator;
use super::model::{ItineraryBrief, ItineraryPlan, ItineraryRequest};
use crate::core::config::Config;
use crate::domains::tools::{ToolError, ToolResult};
use crate::domains::upstream::{
    Geocoder, GeminiClient, HttpClient, NominatimGeocoder, OpenMeteoWeather, OverpassPlaces,
    PlacesSource, ThreadRandom, WeatherProvider,
};

/// Coordinates the upstream services for one `budgetDate` call.
#[derive(Clone)]
pub struct DatePlanner {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    places: Arc<dyn PlacesSource>,
    generator: ItineraryGenerator,
    /// Pause after a geocoder hit, before the next upstream call.
    geocode_delay: Duration,
}

impl DatePlanner {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        places: Arc<dyn PlacesSource>,
        generator: ItineraryGenerator,
        geocode_delay: Duration,
    ) -> Self {
        Self {
            geocoder,
            weather,
            places,
            generator,
            geocode_delay,
        }
    }

    /// Wire the live upstream clients from configuration.
    pub fn from_config(config: &Config) -> ToolResult<Self> {
        let upstreams = &config.upstreams;
        let http = HttpClient::new(upstreams)?;

        Ok(Self::new(
            Arc::new(NominatimGeocoder::new(http.clone(), &upstreams.nominatim_url)),
            Arc::new(OpenMeteoWeather::new(http.clone(), &upstreams.open_meteo_url)),
            Arc::new(OverpassPlaces::new(
                http.clone(),
                &upstreams.overpass_url,
                Arc::new(ThreadRandom),
            )),
            ItineraryGenerator::new(Arc::new(GeminiClient::new(
                http,
                &upstreams.gemini_url,
                config.generation.clone(),
            ))),
            upstreams.geocode_delay(),
        ))
    }

    #[instrument(skip_all, fields(budget = request.budget, spin = request.spin()))]
    pub async fn plan(&self, request: ItineraryRequest) -> ToolResult<ItineraryPlan> {
        request.validate()?;

        let (lat, lon, label) = self.resolve_location(&request).await?;
        debug!(lat, lon, location = %label, "Location resolved");

        let weather = self.weather.current_weather(lat, lon).await?;
        let places = self
            .places
            .find_places(lat, lon, request.preferences.as_deref(), request.spin())
            .await?;
        info!(
            location = %label,
            weather = %weather.description,
            places = places.len(),
            "Upstream context gathered"
        );

        let brief = ItineraryBrief {
            budget: request.budget,
            city: label,
            weather,
            preferences: request.preferences.unwrap_or_default(),
            places,
        };
        self.generator.generate(&brief).await
    }

    async fn resolve_location(&self, request: &ItineraryRequest) -> ToolResult<(f64, f64, String)> {
        if let Some((lat, lon)) = request.coordinates() {
            let label = request
                .city_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{lat:.3},{lon:.3}"));
            return Ok((lat, lon, label));
        }

        let Some(city) = request.city_name() else {
            return Err(ToolError::bad_request(
                "latitude/longitude or city is required",
            ));
        };

        let point = self
            .geocoder
            .geocode(city)
            .await?
            .ok_or_else(|| ToolError::bad_request("Could not find city"))?;
        let label = point.short_name().unwrap_or(city).to_string();

        // Nominatim usage policy: at most one request per second.
        tokio::time::sleep(self.geocode_delay).await;

        Ok((point.lat, point.lon, label))
    }
}
