//! HTTP transport implementation.
//!
//! Serves three surfaces from one axum router:
//! - plain REST tool endpoints (`GET /tools`, `POST /tools/call`)
//! - the bearer-token handshake (`POST /`, `/validate`, `/tools/validate`)
//! - JSON-RPC 2.0 over POST at the configured path (default `/mcp`)
//!
//! Every response carries `Cache-Control: no-store`.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::tools::{ToolError, ValidationIssue, definitions::ValidateTool};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }
}

/// `POST /tools/call` body.
#[derive(Debug, Deserialize)]
struct ToolCallEnvelope {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    rpc_path: Arc<str>,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport until the listener fails.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → JSON-RPC:  POST {}", self.config.rpc_path);
        info!("  → Tools:     GET /tools, POST /tools/call");
        info!("  → Handshake: POST /, /validate, /tools/validate");
        info!("  → Health:    GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router for `server`.
pub fn router(server: McpServer, config: &HttpConfig) -> Router {
    let rpc_at_root = config.rpc_path == "/";
    let state = AppState {
        server,
        rpc_path: Arc::from(config.rpc_path.as_str()),
    };

    let root: MethodRouter<AppState> = if rpc_at_root {
        get(root_handler).post(handle_rpc)
    } else {
        get(root_handler).post(handshake_root)
    };

    let mut app = Router::new()
        .route("/", root)
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/tools/list", get(list_tools))
        .route("/tools/call", post(call_tool))
        .route("/validate", post(handshake_alias))
        .route("/tools/validate", post(handshake_alias));
    if !rpc_at_root {
        app = app.route(&config.rpc_path, post(handle_rpc));
    }

    let mut app = app.with_state(state).layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ));

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn status_of(err: &ToolError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// `{error, kind, details?}` with the status of the error kind.
fn error_response(err: &ToolError) -> Response {
    if err.status_code() >= 500 {
        error!(kind = err.kind(), "{err}");
    } else {
        warn!(kind = err.kind(), "{err}");
    }
    (status_of(err), Json(err.to_payload())).into_response()
}

fn endpoints(state: &AppState) -> Value {
    json!({
        "rpc": &*state.rpc_path,
        "health": "/health",
        "tools": "/tools",
        "call": "/tools/call",
        "validate": "/validate"
    })
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "service": state.server.name(),
        "name": state.server.name(),
        "version": state.server.version(),
        "time": now(),
        "endpoints": endpoints(&state)
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "service": "mcp",
        "time": now()
    }))
}

async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.server.list_tools() }))
}

#[instrument(skip_all, fields(tool))]
async fn call_tool(State(state): State<AppState>, body: Bytes) -> Response {
    let envelope: ToolCallEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Malformed tool call body: {e}");
            let details = vec![ValidationIssue {
                path: String::new(),
                message: e.to_string(),
            }];
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid tool call: expected {name, arguments}",
                    "kind": "bad_request",
                    "details": details
                })),
            )
                .into_response();
        }
    };
    tracing::Span::current().record("tool", envelope.name.as_str());

    let arguments = envelope.arguments.unwrap_or_else(|| json!({}));
    match state.server.call_tool(&envelope.name, arguments).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Token from `Authorization: Bearer <token>`.
fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Body `token`, then body `bearer_token`, then the Authorization header.
fn handshake_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    let body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    ["token", "bearer_token"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| bearer_from_headers(headers))
}

fn handshake(state: &AppState, headers: &HeaderMap, body: &Bytes, full: bool) -> Response {
    let Some(token) = handshake_token(headers, body) else {
        warn!("Handshake without a bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "ok": false, "error": "Missing bearer token" })),
        )
            .into_response();
    };

    match state.server.validate_token(&token) {
        Ok(phone) if full => Json(json!({
            "ok": true,
            "phone": phone,
            "endpoints": endpoints(state),
            "server": {
                "name": state.server.name(),
                "version": state.server.version()
            }
        }))
        .into_response(),
        Ok(phone) => Json(json!({ "ok": true, "phone": phone })).into_response(),
        Err(e) => {
            warn!(kind = e.kind(), "Handshake rejected: {e}");
            (status_of(&e), Json(json!({ "ok": false, "error": e.to_string() }))).into_response()
        }
    }
}

async fn handshake_root(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handshake(&state, &headers, &body, true)
}

async fn handshake_alias(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handshake(&state, &headers, &body, false)
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let response = process_request(&state, request, bearer_from_headers(&headers)).await;

    (StatusCode::OK, Json(response))
}

/// Process a JSON-RPC request and return the response.
async fn process_request(
    state: &AppState,
    request: JsonRpcRequest,
    bearer: Option<String>,
) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => {
            JsonRpcResponse::success(request.id, json!({ "tools": state.server.list_tools() }))
        }
        "tools/call" => handle_tools_call(state, request, bearer).await,
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");
    JsonRpcResponse::success(
        request.id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": state.server.name(),
                "version": state.server.version()
            },
            "instructions": state.server.instructions()
        }),
    )
}

/// Put the header token into `validate` arguments that carry none.
fn fill_validate_token(arguments: &mut Value, bearer: Option<String>) {
    let (Some(token), Value::Object(map)) = (bearer, arguments) else {
        return;
    };
    let has_token = ["token", "bearer_token"].iter().any(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .is_some_and(|t| !t.trim().is_empty())
    });
    if !has_token {
        map.insert("token".to_string(), Value::String(token));
    }
}

async fn handle_tools_call(
    state: &AppState,
    request: JsonRpcRequest,
    bearer: Option<String>,
) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };
    info!(tool = name, "Processing tools/call request");

    let mut arguments = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(args) => args.clone(),
    };
    if name == ValidateTool::NAME {
        fill_validate_token(&mut arguments, bearer);
    }

    match state.server.call_tool(name, arguments).await {
        Ok(mut result) => {
            result["isError"] = Value::Bool(false);
            JsonRpcResponse::success(request.id, result)
        }
        Err(ToolError::NotFound(msg)) => JsonRpcResponse::invalid_params(request.id, msg),
        Err(e) => {
            warn!(kind = e.kind(), "Tool call failed: {e}");
            JsonRpcResponse::success(
                request.id,
                json!({
                    "content": [{ "type": "text", "text": e.to_string() }],
                    "structuredContent": e.to_payload(),
                    "isError": true
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::domains::upstream::testing::{PLAN_REPLY, static_context};
    use http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let server = McpServer::with_context(Config::default(), static_context(PLAN_REPLY));
        router(server, &HttpConfig::default())
    }

    async fn send(request: Request<axum::body::Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn post(uri: &str, body: Value) -> Request<axum::body::Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, headers, body) =
            send(Request::get("/").body(axum::body::Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(body["ok"], true);
        assert_eq!(body["endpoints"]["rpc"], "/mcp");

        let (status, _, _) = send(Request::head("/").body(axum::body::Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) =
            send(Request::get("/health").body(axum::body::Body::empty()).unwrap()).await;
        assert_eq!(body["service"], "mcp");
    }

    #[tokio::test]
    async fn test_tools_listing_aliases() {
        for uri in ["/tools", "/tools/list"] {
            let (status, _, body) =
                send(Request::get(uri).body(axum::body::Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::OK);
            let tools = body["tools"].as_array().unwrap();
            assert_eq!(tools.len(), 2);
            assert!(tools[0]["inputSchema"].is_object());
        }
    }

    #[tokio::test]
    async fn test_tools_call_budget_date() {
        let (status, _, body) = send(post(
            "/tools/call",
            json!({ "name": "budgetDate", "arguments": { "budget": 40, "city": "Berlin" } }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);

        let plan: Value =
            serde_json::from_str(body["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(plan["total_cost"], 40.0);
        assert_eq!(plan["title"], "💘 Sunset Picnic");
    }

    #[tokio::test]
    async fn test_tools_call_error_statuses() {
        let (status, _, body) = send(post("/tools/call", json!({ "name": "nope" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, _, body) = send(post("/tools/call", json!({ "arguments": {} }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].is_array());

        let (status, _, body) = send(post(
            "/tools/call",
            json!({ "name": "budgetDate", "arguments": { "budget": -5, "city": "Paris" } }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");

        let (status, _, _) = send(post(
            "/tools/call",
            json!({ "name": "validate", "arguments": { "token": "unknown" } }),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_handshake_token_sources() {
        let (status, _, body) = send(post("/", json!({ "token": "tok-1" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phone"], "15551234567");
        assert!(body["server"]["name"].is_string());

        let (_, _, body) = send(post("/validate", json!({ "bearer_token": "tok-1" }))).await;
        assert_eq!(body, json!({ "ok": true, "phone": "15551234567" }));

        let request = Request::post("/tools/validate")
            .header(header::AUTHORIZATION, "Bearer tok-1")
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phone"], "15551234567");
    }

    #[tokio::test]
    async fn test_handshake_failures() {
        let (status, _, body) = send(post("/validate", json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);

        let (status, _, body) = send(post("/", json!({ "token": "stranger" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_rpc_initialize_and_list() {
        let (_, _, body) = send(post(
            "/mcp",
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
        ))
        .await;
        assert_eq!(body["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(body["result"]["capabilities"]["tools"].is_object());

        let (_, _, body) = send(post(
            "/mcp",
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        ))
        .await;
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 2);

        let (_, _, body) = send(post(
            "/mcp",
            json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" }),
        ))
        .await;
        assert_eq!(body["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_rpc_validate_uses_bearer_header() {
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "bearer tok-1")
            .body(axum::body::Body::from(
                json!({
                    "jsonrpc": "2.0",
                    "id": 4,
                    "method": "tools/call",
                    "params": { "name": "validate", "arguments": {} }
                })
                .to_string(),
            ))
            .unwrap();
        let (_, _, body) = send(request).await;
        assert_eq!(body["result"]["content"][0]["text"], "15551234567");
        assert_eq!(body["result"]["isError"], false);
    }

    #[tokio::test]
    async fn test_rpc_tool_failure_is_error_result() {
        let (_, _, body) = send(post(
            "/mcp",
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": { "name": "validate", "arguments": { "token": "stranger" } }
            }),
        ))
        .await;
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(body["result"]["structuredContent"]["kind"], "unauthorized");
    }

    #[test]
    fn test_fill_validate_token_keeps_explicit_token() {
        let mut args = json!({ "token": "given" });
        fill_validate_token(&mut args, Some("header".to_string()));
        assert_eq!(args["token"], "given");

        let mut args = json!({ "token": " " });
        fill_validate_token(&mut args, Some("header".to_string()));
        assert_eq!(args["token"], "header");
    }
}
