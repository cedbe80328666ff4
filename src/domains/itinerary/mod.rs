//! Itinerary domain.
//!
//! Owns the `budgetDate` pipeline: request model, upstream coordination,
//! prompt construction, and recovery/validation of model output.

mod generator;
mod model;
pub mod parse;
mod planner;
pub mod prompt;

pub use generator::ItineraryGenerator;
pub use model::{
    CostItem, GeoPoint, ItineraryBrief, ItineraryPlan, ItineraryRequest, PlaceCandidate,
    WeatherObservation,
};
pub use planner::DatePlanner;
