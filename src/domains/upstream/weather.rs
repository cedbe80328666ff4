//! Current weather via Open-Meteo.
//!
//! Open-Meteo needs no API key. It reports conditions as WMO weather
//! interpretation codes, which are mapped to short English descriptions.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{HttpClient, WeatherProvider};
use crate::domains::itinerary::WeatherObservation;
use crate::domains::tools::ToolResult;

const SERVICE: &str = "Open-Meteo";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    #[serde(default)]
    weather_code: Option<u16>,
}

/// Describe a WMO weather interpretation code.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 => "light rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 => "snow",
        77 => "snow grains",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown conditions",
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoWeather {
    http: HttpClient,
    base_url: String,
}

impl OpenMeteoWeather {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    #[instrument(skip(self))]
    async fn current_weather(&self, lat: f64, lon: f64) -> ToolResult<WeatherObservation> {
        let url = format!("{}/v1/forecast", self.base_url.trim_end_matches('/'));
        let request = self.http.get(&url).query(&[
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
        ]);

        let forecast: ForecastResponse = self.http.send_json(SERVICE, request).await?;
        let description = forecast
            .current
            .weather_code
            .map(describe_weather_code)
            .unwrap_or("unknown conditions");

        debug!(temperature = forecast.current.temperature_2m, description, "Current weather");

        Ok(WeatherObservation {
            temperature: forecast.current.temperature_2m,
            description: description.to_string(),
        })
    }
}
