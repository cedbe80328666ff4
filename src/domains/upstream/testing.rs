//! Canned upstreams for tests above the adapter layer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{Geocoder, PlacesSource, TextGenerator, WeatherProvider};
use crate::domains::auth::TokenDirectory;
use crate::domains::itinerary::{
    DatePlanner, GeoPoint, ItineraryGenerator, PlaceCandidate, WeatherObservation,
};
use crate::domains::tools::{ToolContext, ToolResult};

pub(crate) const PLAN_REPLY: &str =
    r#"{"title":"Sunset Picnic","steps":["Coffee","Park walk","Gelato"],"total_cost":42}"#;

/// Answers every upstream call with fixed data; the model returns `reply`.
pub(crate) struct StaticUpstream {
    pub reply: String,
}

#[async_trait]
impl Geocoder for StaticUpstream {
    async fn geocode(&self, city: &str) -> ToolResult<Option<GeoPoint>> {
        Ok((city != "Nowhere").then(|| GeoPoint {
            lat: 52.52,
            lon: 13.405,
            display_name: "Berlin, Deutschland".to_string(),
        }))
    }
}

#[async_trait]
impl WeatherProvider for StaticUpstream {
    async fn current_weather(&self, _lat: f64, _lon: f64) -> ToolResult<WeatherObservation> {
        Ok(WeatherObservation {
            temperature: 21.0,
            description: "clear sky".to_string(),
        })
    }
}

#[async_trait]
impl PlacesSource for StaticUpstream {
    async fn find_places(
        &self,
        lat: f64,
        lon: f64,
        _preferences: Option<&str>,
        _spin: bool,
    ) -> ToolResult<Vec<PlaceCandidate>> {
        Ok(vec![PlaceCandidate {
            id: 1,
            name: "Tiergarten".to_string(),
            kind: "park".to_string(),
            lat,
            lon,
        }])
    }
}

#[async_trait]
impl TextGenerator for StaticUpstream {
    async fn generate_text(&self, _prompt: &str) -> ToolResult<String> {
        Ok(self.reply.clone())
    }
}

pub(crate) fn static_planner(reply: &str) -> DatePlanner {
    let upstream = Arc::new(StaticUpstream {
        reply: reply.to_string(),
    });
    DatePlanner::new(
        upstream.clone(),
        upstream.clone(),
        upstream.clone(),
        ItineraryGenerator::new(upstream),
        Duration::ZERO,
    )
}

/// Context with token `tok-1` mapped to `+1 (555) 123-4567` and no owner fallback.
pub(crate) fn static_context(reply: &str) -> Arc<ToolContext> {
    let tokens = HashMap::from([("tok-1".to_string(), "+1 (555) 123-4567".to_string())]);
    Arc::new(ToolContext::new(
        TokenDirectory::new(tokens, None),
        static_planner(reply),
    ))
}
