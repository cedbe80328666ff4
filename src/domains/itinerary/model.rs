//! Itinerary data model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::tools::{ToolError, ToolResult};

/// Arguments of the `budgetDate` tool.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ItineraryRequest {
    /// Total spend ceiling for the date. Must be positive.
    #[schemars(description = "Total budget for the date (must be positive)")]
    pub budget: f64,

    /// City to plan in. Ignored when both coordinates are given.
    #[schemars(description = "City name, used when latitude/longitude are not given")]
    #[serde(default)]
    pub city: Option<String>,

    #[schemars(description = "Latitude in decimal degrees")]
    #[serde(default)]
    pub latitude: Option<f64>,

    #[schemars(description = "Longitude in decimal degrees")]
    #[serde(default)]
    pub longitude: Option<f64>,

    /// Comma separated interests, e.g. "coffee, museum".
    #[schemars(description = "Comma separated preferences such as 'coffee, museum, park'")]
    #[serde(default)]
    pub preferences: Option<String>,

    /// Ignore preferences and pick from a broad default set of places.
    #[schemars(description = "Ignore preferences and pick from a broad default set of places")]
    #[serde(default)]
    pub spin: Option<bool>,
}

impl ItineraryRequest {
    /// Parse tool arguments, rejecting anything malformed as a bad request.
    pub fn from_arguments(arguments: serde_json::Value) -> ToolResult<Self> {
        let request: Self = serde_json::from_value(arguments)
            .map_err(|e| ToolError::bad_request(format!("Invalid arguments: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> ToolResult<()> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(ToolError::bad_request("budget must be a positive number"));
        }
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ToolError::bad_request("latitude must be between -90 and 90"));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ToolError::bad_request("longitude must be between -180 and 180"));
            }
        }
        Ok(())
    }

    /// Both coordinates, when the caller supplied them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// City name with surrounding whitespace removed; blank names count as absent.
    pub fn city_name(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn spin(&self) -> bool {
        self.spin.unwrap_or(false)
    }
}

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl GeoPoint {
    /// First comma segment of the display name ("Paris, Île-de-France, France" → "Paris").
    pub fn short_name(&self) -> Option<&str> {
        self.display_name
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Current conditions at the date location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Degrees Celsius.
    pub temperature: f64,
    pub description: String,
}

/// A nearby point of interest offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: u64,
    pub name: String,
    /// Category label (amenity, tourism or leisure tag value).
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lon: f64,
}

/// One priced line of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub name: String,
    pub cost: f64,
}

/// The itinerary returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub title: String,
    pub steps: Vec<String>,
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<CostItem>>,
}

/// Everything the generator needs to write a plan.
#[derive(Debug, Clone)]
pub struct ItineraryBrief {
    pub budget: f64,
    /// Location label shown to the model.
    pub city: String,
    pub weather: WeatherObservation,
    pub preferences: String,
    pub places: Vec<PlaceCandidate>,
}
