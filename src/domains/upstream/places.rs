//! Nearby points of interest via the Overpass API.
//!
//! Preferences are matched against a small keyword table; each hit becomes an
//! Overpass fragment selecting one OSM tag within [`SEARCH_RADIUS_M`] of the
//! location. Results are normalized, deduplicated by name, shuffled and capped
//! at [`MAX_PLACES`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::random::{RandomSource, shuffle};
use super::{HttpClient, PlacesSource};
use crate::domains::itinerary::PlaceCandidate;
use crate::domains::tools::{ToolError, ToolResult};

const SERVICE: &str = "Overpass";

/// Search radius around the location, in metres.
pub const SEARCH_RADIUS_M: u32 = 3000;

/// Upper bound on candidates handed to the generator.
pub const MAX_PLACES: usize = 20;

/// Category label for places carrying none of the known tags.
const UNKNOWN_KIND: &str = "place";

/// One OSM tag selector, rendered as an Overpass query fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceFilter {
    pub key: &'static str,
    pub value: &'static str,
}

impl PlaceFilter {
    const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }

    /// `node(around:3000,LAT,LON)[key=value];`
    pub fn fragment(&self, lat: f64, lon: f64) -> String {
        format!(
            "node(around:{SEARCH_RADIUS_M},{lat},{lon})[{}={}];",
            self.key, self.value
        )
    }
}

const CAFE: PlaceFilter = PlaceFilter::new("amenity", "cafe");
const GALLERY: PlaceFilter = PlaceFilter::new("tourism", "gallery");
const MUSEUM: PlaceFilter = PlaceFilter::new("tourism", "museum");
const MUSIC_VENUE: PlaceFilter = PlaceFilter::new("amenity", "music_venue");
const PARK: PlaceFilter = PlaceFilter::new("leisure", "park");
const CINEMA: PlaceFilter = PlaceFilter::new("amenity", "cinema");
const RESTAURANT: PlaceFilter = PlaceFilter::new("amenity", "restaurant");
const BAR: PlaceFilter = PlaceFilter::new("amenity", "bar");
const ICE_CREAM: PlaceFilter = PlaceFilter::new("amenity", "ice_cream");
const PUB: PlaceFilter = PlaceFilter::new("amenity", "pub");

/// Broad categories used for spins and when no preference matches.
pub const DEFAULT_FILTERS: [PlaceFilter; 6] = [CAFE, PARK, MUSEUM, RESTAURANT, ICE_CREAM, PUB];

fn keyword_filter(keyword: &str) -> Option<PlaceFilter> {
    match keyword {
        "coffee" | "cafe" => Some(CAFE),
        "art" => Some(GALLERY),
        "museum" => Some(MUSEUM),
        "music" => Some(MUSIC_VENUE),
        "park" => Some(PARK),
        "cinema" => Some(CINEMA),
        "restaurant" => Some(RESTAURANT),
        "bar" => Some(BAR),
        _ => None,
    }
}

/// Pick the filters for a request.
///
/// Spins, empty preferences and preferences with no known keyword all fall
/// back to [`DEFAULT_FILTERS`].
pub fn select_filters(preferences: Option<&str>, spin: bool) -> Vec<PlaceFilter> {
    if spin {
        return DEFAULT_FILTERS.to_vec();
    }

    let matched: Vec<PlaceFilter> = preferences
        .unwrap_or_default()
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .filter_map(|token| keyword_filter(&token))
        .collect();

    if matched.is_empty() {
        DEFAULT_FILTERS.to_vec()
    } else {
        matched
    }
}

/// Build the Overpass QL union query for the given filters.
pub fn build_overpass_query(lat: f64, lon: f64, filters: &[PlaceFilter]) -> String {
    let fragments: Vec<String> = filters.iter().map(|f| f.fragment(lat, lon)).collect();
    format!(
        "[out:json];\n(\n  {}\n);\nout center;",
        fragments.join("\n  ")
    )
}

#[derive(Debug, Default, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Convert to a candidate if it has a name and coordinates.
    ///
    /// Area results carry their coordinates in `center`.
    fn into_candidate(self) -> Option<PlaceCandidate> {
        let name = self.tags.get("name").map(|n| n.trim()).filter(|n| !n.is_empty())?;
        let lat = self.lat.or(self.center.map(|c| c.lat))?;
        let lon = self.lon.or(self.center.map(|c| c.lon))?;
        let kind = ["amenity", "tourism", "leisure"]
            .iter()
            .find_map(|key| self.tags.get(*key))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_KIND);

        Some(PlaceCandidate {
            id: self.id,
            name: name.to_string(),
            kind: kind.to_string(),
            lat,
            lon,
        })
    }
}

/// Keep the first candidate for each case-insensitive name.
pub fn dedupe_by_name(places: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.name.to_lowercase()))
        .collect()
}

/// Normalize, deduplicate, shuffle and cap raw Overpass elements.
pub fn prepare_candidates(
    elements: Vec<OverpassElement>,
    rng: &dyn RandomSource,
) -> Vec<PlaceCandidate> {
    let normalized: Vec<PlaceCandidate> = elements
        .into_iter()
        .filter_map(OverpassElement::into_candidate)
        .collect();

    let mut places = dedupe_by_name(normalized);
    shuffle(&mut places, rng);
    places.truncate(MAX_PLACES);
    places
}

/// Overpass API client.
#[derive(Clone)]
pub struct OverpassPlaces {
    http: HttpClient,
    base_url: String,
    rng: Arc<dyn RandomSource>,
}

impl OverpassPlaces {
    pub fn new(http: HttpClient, base_url: impl Into<String>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            rng,
        }
    }
}

#[async_trait]
impl PlacesSource for OverpassPlaces {
    #[instrument(skip(self))]
    async fn find_places(
        &self,
        lat: f64,
        lon: f64,
        preferences: Option<&str>,
        spin: bool,
    ) -> ToolResult<Vec<PlaceCandidate>> {
        let filters = select_filters(preferences, spin);
        let query = build_overpass_query(lat, lon, &filters);
        debug!(fragments = filters.len(), "Querying Overpass");

        let body = serde_urlencoded::to_string([("data", query.as_str())])
            .map_err(|e| ToolError::internal(format!("Failed to encode Overpass query: {e}")))?;

        let url = format!("{}/api/interpreter", self.base_url.trim_end_matches('/'));
        let request = self
            .http
            .post(&url)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(body);

        let response: OverpassResponse = self.http.send_json(SERVICE, request).await?;
        let raw = response.elements.len();
        let places = prepare_candidates(response.elements, self.rng.as_ref());
        debug!(raw, kept = places.len(), "Places prepared");

        Ok(places)
    }
}
