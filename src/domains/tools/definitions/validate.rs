//! Token validation tool.
//!
//! Exchanges a bearer token for the phone number of the account it belongs to.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::Tool,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

#[cfg(feature = "http")]
use super::common::text_content;
use super::common::{error_result, success_result};
use crate::domains::tools::{ToolContext, ToolError, ToolResult};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the validate tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ValidateParams {
    /// Bearer token issued to the client.
    #[serde(default)]
    pub token: Option<String>,

    /// Alternate field name some clients send the token under.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl ValidateParams {
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            bearer_token: None,
        }
    }

    /// `token`, else `bearer_token`; blank values count as missing.
    pub fn token(&self) -> Option<&str> {
        [&self.token, &self.bearer_token]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct ValidateTool;

impl ValidateTool {
    pub const NAME: &'static str = "validate";

    pub const DESCRIPTION: &'static str =
        "Validate a bearer token and return the owner's phone number as digits only.";

    /// Resolve the token to normalized phone digits.
    #[instrument(skip_all)]
    pub fn execute(params: &ValidateParams, context: &ToolContext) -> ToolResult<String> {
        let token = params
            .token()
            .ok_or_else(|| ToolError::bad_request("token must be a non-empty string"))?;
        let phone = context.tokens.resolve(token)?;
        info!("Token validated");
        Ok(phone)
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        context: Arc<ToolContext>,
    ) -> ToolResult<serde_json::Value> {
        let params: ValidateParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::bad_request(format!("Invalid arguments: {e}")))?;
        Self::execute(&params, &context).map(text_content)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ValidateParams>(),
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
                let params: ValidateParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(match Self::execute(&params, &context) {
                    Ok(phone) => success_result(phone),
                    Err(e) => error_result(&e),
                })
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::TokenDirectory;
    use crate::domains::upstream::testing::{PLAN_REPLY, static_context, static_planner};
    use std::collections::HashMap;

    #[test]
    fn test_known_token_returns_digits() {
        let context = static_context(PLAN_REPLY);
        let phone = ValidateTool::execute(&ValidateParams::from_token("tok-1"), &context).unwrap();
        assert_eq!(phone, "15551234567");
    }

    #[test]
    fn test_bearer_token_alias() {
        let context = static_context(PLAN_REPLY);
        let params = ValidateParams {
            token: Some("  ".to_string()),
            bearer_token: Some("tok-1".to_string()),
        };
        assert_eq!(ValidateTool::execute(&params, &context).unwrap(), "15551234567");
    }

    #[test]
    fn test_unknown_token_without_owner_is_unauthorized() {
        let context = static_context(PLAN_REPLY);
        let err = ValidateTool::execute(&ValidateParams::from_token("unknown"), &context)
            .unwrap_err();
        assert!(matches!(err, ToolError::Unauthorized(_)));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_unknown_token_falls_back_to_owner() {
        let context = ToolContext::new(
            TokenDirectory::new(HashMap::new(), Some("+44 20 7946 0958".to_string())),
            static_planner(PLAN_REPLY),
        );
        let phone = ValidateTool::execute(&ValidateParams::from_token("anything"), &context)
            .unwrap();
        assert_eq!(phone, "442079460958");
    }

    #[test]
    fn test_missing_token_is_bad_request() {
        let context = static_context(PLAN_REPLY);
        let err = ValidateTool::execute(&ValidateParams::default(), &context).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_http_handler_wraps_text_content() {
        let body = ValidateTool::http_handler(
            serde_json::json!({ "token": "tok-1" }),
            static_context(PLAN_REPLY),
        )
        .await
        .unwrap();
        assert_eq!(body["content"][0]["type"], "text");
        assert_eq!(body["content"][0]["text"], "15551234567");
    }

    #[test]
    fn test_schema_lists_token_fields() {
        let tool = ValidateTool::to_tool();
        let properties = tool.input_schema.get("properties").unwrap();
        assert!(properties.get("token").is_some());
        assert!(properties.get("bearer_token").is_some());
    }
}
