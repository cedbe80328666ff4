//! Itinerary generation: prompt, model call, recovery, validation, clamp.

use std::sync::Arc;

use tracing::{info, instrument};

use super::model::{ItineraryBrief, ItineraryPlan};
use super::parse::{finalize_plan, parse_model_json, validate_plan};
use super::prompt::build_prompt;
use crate::domains::tools::ToolResult;
use crate::domains::upstream::TextGenerator;

/// Turns an [`ItineraryBrief`] into a validated [`ItineraryPlan`].
///
/// One model call per plan; no retries.
#[derive(Clone)]
pub struct ItineraryGenerator {
    model: Arc<dyn TextGenerator>,
}

impl ItineraryGenerator {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    #[instrument(skip_all, fields(budget = brief.budget, city = %brief.city, places = brief.places.len()))]
    pub async fn generate(&self, brief: &ItineraryBrief) -> ToolResult<ItineraryPlan> {
        let prompt = build_prompt(brief);
        let text = self.model.generate_text(&prompt).await?;

        let value = parse_model_json(&text)?;
        let plan = finalize_plan(validate_plan(value)?, brief.budget);

        info!(title = %plan.title, total_cost = plan.total_cost, "Itinerary generated");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::itinerary::{PlaceCandidate, WeatherObservation};
    use crate::domains::tools::ToolError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned reply and remembers the prompt it was given.
    struct CannedModel {
        reply: ToolResult<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for CannedModel {
        async fn generate_text(&self, prompt: &str) -> ToolResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(ToolError::configuration("GEMINI_API_KEY not configured")),
            }
        }
    }

    fn brief(budget: f64) -> ItineraryBrief {
        ItineraryBrief {
            budget,
            city: "Paris".to_string(),
            weather: WeatherObservation {
                temperature: 9.0,
                description: "overcast".to_string(),
            },
            preferences: "museum".to_string(),
            places: vec![PlaceCandidate {
                id: 1,
                name: "Musée Rodin".to_string(),
                kind: "museum".to_string(),
                lat: 48.855,
                lon: 2.315,
            }],
        }
    }

    #[tokio::test]
    async fn test_over_budget_plan_is_clamped_and_titled() {
        let model = CannedModel::replying(
            r#"{"title":"Gallery Hop","steps":["Rodin","Crêpes","Seine walk"],"total_cost":180,"breakdown":[{"name":"Rodin","cost":30},{"name":"Crêpes","cost":150}]}"#,
        );
        let plan = ItineraryGenerator::new(model.clone())
            .generate(&brief(100.0))
            .await
            .unwrap();

        assert_eq!(plan.total_cost, 100.0);
        assert_eq!(plan.title, "💘 Gallery Hop");
        assert_eq!(plan.breakdown.as_ref().map(Vec::len), Some(2));

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Musée Rodin (museum)"));
        assert!(prompts[0].contains("Weather: 9°C, overcast"));
    }

    #[tokio::test]
    async fn test_prose_wrapped_reply_recovered() {
        let model = CannedModel::replying(
            "Here you go!\n{\"title\":\"🌧️ Cozy\",\"steps\":[\"a\",\"b\",\"c\"],\"total_cost\":20}\nHave fun",
        );
        let plan = ItineraryGenerator::new(model).generate(&brief(50.0)).await.unwrap();
        assert_eq!(plan.title, "🌧️ Cozy");
        assert_eq!(plan.total_cost, 20.0);
    }

    #[tokio::test]
    async fn test_schema_violation_is_bad_gateway() {
        let model = CannedModel::replying(r#"{"title":"Short","steps":["a","b"],"total_cost":5}"#);
        let err = ItineraryGenerator::new(model).generate(&brief(50.0)).await.unwrap_err();
        match err {
            ToolError::BadGateway { details, .. } => assert_eq!(details[0].path, "/steps"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_reply_is_bad_gateway() {
        let model = CannedModel::replying("Sorry, I can't plan dates today.");
        let err = ItineraryGenerator::new(model).generate(&brief(50.0)).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Arc::new(CannedModel {
            reply: Err(ToolError::internal("unused")),
            prompts: Mutex::new(Vec::new()),
        });
        let err = ItineraryGenerator::new(model).generate(&brief(50.0)).await.unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }
}
