//! Recovery and validation of model output.
//!
//! Model text is parsed in two stages: the whole text as JSON, then the
//! brace-delimited object embedded in it. The parsed value is checked against
//! the plan schema before it is trusted, and the finished plan is clamped to
//! the budget and given an emoji title.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use super::model::ItineraryPlan;
use crate::domains::tools::{ToolError, ToolResult, ValidationIssue};

/// Outermost `{ ... }` span, across newlines.
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid"));

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Extended_Pictographic}|\p{Regional_Indicator}|\x{20E3}")
        .expect("emoji pattern is valid")
});

/// Prefix for titles the model left without an emoji.
pub const TITLE_EMOJI: &str = "💘";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model output contains no JSON object")]
    NoObject,

    #[error("model output is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl From<ParseError> for ToolError {
    fn from(err: ParseError) -> Self {
        ToolError::bad_gateway(format!("Gemini returned non-JSON text: {err}"))
    }
}

/// First brace-balanced object starting at the first `{`, ignoring braces in strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse model text as JSON, falling back to the object embedded in it.
pub fn parse_model_json(text: &str) -> Result<Value, ParseError> {
    let direct = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    debug!("Model output is not bare JSON ({direct}), trying object extraction");

    let span = OBJECT_SPAN.find(text).map(|m| m.as_str());
    let balanced = balanced_object(text);
    if span.is_none() && balanced.is_none() {
        return Err(ParseError::NoObject);
    }

    let mut last_error = direct;
    for candidate in [span, balanced].into_iter().flatten() {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = e,
        }
    }
    Err(ParseError::Malformed(last_error))
}

/// JSON schema every plan must satisfy.
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "required": ["title", "steps", "total_cost"],
        "properties": {
            "title": { "type": "string" },
            "steps": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 3
            },
            "total_cost": { "type": "number" },
            "weather_note": { "type": "string" },
            "breakdown": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "cost"],
                    "properties": {
                        "name": { "type": "string" },
                        "cost": { "type": "number" }
                    }
                }
            }
        }
    })
}

/// Check a parsed value against [`plan_schema`] and convert it.
///
/// Every violation is reported in the error details; nothing is coerced.
pub fn validate_plan(value: Value) -> ToolResult<ItineraryPlan> {
    let schema = plan_schema();
    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|e| ToolError::internal(format!("Invalid plan schema: {e}")))?;

    let issues: Vec<ValidationIssue> = match compiled.validate(&value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| ValidationIssue {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect(),
    };

    if !issues.is_empty() {
        warn!(issues = issues.len(), "Model output failed schema validation");
        return Err(ToolError::BadGateway {
            message: "Model output failed schema validation".to_string(),
            details: issues,
        });
    }

    serde_json::from_value(value).map_err(|e| ToolError::BadGateway {
        message: "Model output failed schema validation".to_string(),
        details: vec![ValidationIssue {
            path: String::new(),
            message: e.to_string(),
        }],
    })
}

pub fn has_emoji(text: &str) -> bool {
    EMOJI.is_match(text)
}

/// Enforce the budget ceiling and decorate the title.
///
/// Only `total_cost` is clamped; `steps` and `breakdown` are left as the model
/// wrote them, so a breakdown may no longer sum to the total.
pub fn finalize_plan(mut plan: ItineraryPlan, budget: f64) -> ItineraryPlan {
    if plan.total_cost > budget {
        debug!(total_cost = plan.total_cost, budget, "Clamping total cost to budget");
        plan.total_cost = budget;
    }
    if !has_emoji(&plan.title) {
        plan.title = format!("{TITLE_EMOJI} {}", plan.title);
    }
    plan
}
