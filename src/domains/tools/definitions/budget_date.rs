//! Budget date planning tool.
//!
//! Plans a date itinerary that fits a budget, using live weather and nearby
//! places for the requested location.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use tracing::{info, instrument};

#[cfg(feature = "http")]
use super::common::text_content;
use super::common::error_result;
use crate::domains::itinerary::{ItineraryPlan, ItineraryRequest};
use crate::domains::tools::{ToolContext, ToolError, ToolResult};

pub struct BudgetDateTool;

impl BudgetDateTool {
    pub const NAME: &'static str = "budgetDate";

    pub const DESCRIPTION: &'static str = "Plan a date that fits a budget. Give a budget and either a city or latitude/longitude; \
         optional comma separated preferences (coffee, art, museum, music, park, cinema, restaurant, bar) \
         or spin=true for a surprise mix. Returns a JSON itinerary with title, steps, total_cost and weather_note.";

    /// Run the planning pipeline for one request.
    #[instrument(skip_all, fields(budget = request.budget))]
    pub async fn execute(
        request: ItineraryRequest,
        context: &ToolContext,
    ) -> ToolResult<ItineraryPlan> {
        info!("budgetDate tool called");
        context.planner.plan(request).await
    }

    fn render(plan: &ItineraryPlan) -> ToolResult<String> {
        serde_json::to_string(plan)
            .map_err(|e| ToolError::internal(format!("Failed to encode itinerary: {e}")))
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        context: Arc<ToolContext>,
    ) -> ToolResult<serde_json::Value> {
        let request = ItineraryRequest::from_arguments(arguments)?;
        let plan = Self::execute(request, &context).await?;
        Self::render(&plan).map(text_content)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ItineraryRequest>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO transport.
    pub fn create_route<S>(context: Arc<ToolContext>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let context = context.clone();
            async move {
                let request: ItineraryRequest =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                let outcome = match Self::execute(request, &context).await {
                    Ok(plan) => Self::render(&plan).map(|text| (text, plan)),
                    Err(e) => Err(e),
                };
                Ok(match outcome {
                    Ok((text, plan)) => CallToolResult {
                        content: vec![Content::text(text)],
                        structured_content: serde_json::to_value(&plan).ok(),
                        is_error: Some(false),
                        meta: None,
                    },
                    Err(e) => error_result(&e),
                })
            }
            .boxed()
        })
    }
}
