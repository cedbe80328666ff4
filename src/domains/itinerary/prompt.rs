//! Prompt construction for the itinerary model.

use super::model::{ItineraryBrief, PlaceCandidate};

/// `"name (type), name (type), ..."`
pub fn format_places(places: &[PlaceCandidate]) -> String {
    places
        .iter()
        .map(|p| format!("{} ({})", p.name, p.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the single instruction block sent to the generative model.
pub fn build_prompt(brief: &ItineraryBrief) -> String {
    format!(
        "You are a creative, witty date planner.\n\
         Budget: {budget}\n\
         Location: {city}\n\
         Weather: {temperature}°C, {description}\n\
         Preferences: {preferences}\n\
         Nearby places: {places}\n\
         \n\
         Rules:\n\
         - Suggest 3–4 activities in logical order\n\
         - Keep total cost at or under budget\n\
         - Mix free & paid activities\n\
         - Include fun descriptions\n\
         - If weather is bad, suggest indoor options\n\
         - Output valid JSON strictly matching this schema: \
         {{\"title\": string, \"steps\": string[], \"total_cost\": number, \"weather_note\": string}}\n\
         Return ONLY JSON with no markdown, no backticks.",
        budget = brief.budget,
        city = brief.city,
        temperature = brief.weather.temperature,
        description = brief.weather.description,
        preferences = brief.preferences,
        places = format_places(&brief.places),
    )
}
