use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::rpc::{CallToolParams, RpcError, RpcRequest, RpcResponse};
use crate::tool::{ToolDefinition, ToolResponse};

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Errors from calling a remote service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Protocol error
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    /// The service answered with a JSON-RPC error
    #[error("Remote error: {0}")]
    Remote(#[from] RpcError),
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Default)]
pub struct ServiceClientBuilder {
    url: Option<String>,
    timeout: Option<Duration>,
    agent_id: Option<String>,
}

impl ServiceClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the service (without the `/rpc` suffix).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the agent id sent with tool calls.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<ServiceClient, ClientError> {
        let url = self.url.ok_or_else(|| {
            ClientError::ConnectionError("Service URL is required".to_string())
        })?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or_else(default_timeout))
            .build()
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        Ok(ServiceClient {
            url: url.trim_end_matches('/').to_string(),
            http,
            agent_id: self.agent_id,
            message_id: AtomicU64::new(1),
        })
    }
}

/// A JSON-RPC client for a running pill-buddy service.
#[derive(Debug)]
pub struct ServiceClient {
    url: String,
    http: reqwest::Client,
    agent_id: Option<String>,
    message_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

impl ServiceClient {
    /// Creates a new builder.
    pub fn builder() -> ServiceClientBuilder {
        ServiceClientBuilder::new()
    }

    /// Performs the `initialize` handshake and returns the server's answer.
    pub async fn initialize(&self) -> Result<Value, ClientError> {
        self.call("initialize", serde_json::json!({})).await
    }

    /// Lists the tools the service exposes.
    pub async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ClientError> {
        let result = self.call("tools/list", Value::Object(serde_json::Map::new())).await?;
        let list: ToolsListResult = serde_json::from_value(result)
            .map_err(|e| ClientError::ProtocolError(e.to_string()))?;
        Ok(list.tools)
    }

    /// Calls a tool on the service.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolResponse, ClientError> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
            agent_id: self.agent_id.clone(),
        };
        let params = serde_json::to_value(params)
            .map_err(|e| ClientError::ProtocolError(e.to_string()))?;

        let result = self.call("tools/call", params).await?;
        serde_json::from_value(result).map_err(|e| ClientError::ProtocolError(e.to_string()))
    }

    /// Sends one JSON-RPC request and returns its result.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.message_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);
        debug!(method, id, "Calling {}", self.url);

        let response = self
            .http
            .post(format!("{}/rpc", self.url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::HttpError(format!(
                "HTTP error: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ProtocolError(e.to_string()))?;

        Ok(response.into_result()?)
    }
}
