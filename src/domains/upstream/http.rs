//! Outbound JSON HTTP client shared by all upstream adapters.

use reqwest::{RequestBuilder, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::core::config::UpstreamConfig;
use crate::domains::tools::{ToolError, ToolResult};

/// Thin wrapper over `reqwest::Client` that identifies itself to upstreams
/// and turns non-2xx answers into [`ToolError::Upstream`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the configured user agent and timeout.
    pub fn new(config: &UpstreamConfig) -> ToolResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ToolError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { inner })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.inner.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.inner.post(url)
    }

    /// Send a request and decode a JSON body.
    ///
    /// `service` names the upstream in error messages.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> ToolResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(service, status = status.as_u16(), "Upstream returned an error status");
            return Err(ToolError::upstream(service, status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        debug!(service, bytes = bytes.len(), "Upstream response received");

        serde_json::from_slice(&bytes).map_err(|e| {
            ToolError::bad_gateway(format!("{service} returned an unexpected payload: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn client() -> HttpClient {
        HttpClient::new(&UpstreamConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sends_identifying_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("user-agent", "BudgetDate/1.0 (+https://puch.ai)")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let http = client();
        let value: Value = http
            .send_json("Test", http.get(&format!("{}/ping", server.url())))
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let http = client();
        let err = http
            .send_json::<Value>("Test", http.get(&format!("{}/ping", server.url())))
            .await
            .unwrap_err();

        match err {
            ToolError::Upstream {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "Test");
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body("<html>nope</html>")
            .create_async()
            .await;

        let http = client();
        let err = http
            .send_json::<Value>("Test", http.get(&format!("{}/ping", server.url())))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::BadGateway { .. }));
    }
}
