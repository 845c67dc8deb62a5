use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ServiceMetadata;
use crate::tool::{ExecutionContext, ToolError, ToolExecutor};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// A JSON-RPC 2.0 request or notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(Value::from(id)),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Splits the response into its result or error.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(error),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(Self::PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, message)
    }
}

impl From<ToolError> for RpcError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::InvalidArguments(_) | ToolError::NotFound(_) => {
                Self::invalid_params(error.to_string())
            }
            ToolError::ExecutionFailed(_) => Self::internal(error.to_string()),
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// Dispatches JSON-RPC requests to the registered tools.
#[derive(Debug, Clone)]
pub struct RpcHandler {
    executor: ToolExecutor,
    metadata: ServiceMetadata,
}

impl RpcHandler {
    pub fn new(executor: ToolExecutor, metadata: ServiceMetadata) -> Self {
        Self { executor, metadata }
    }

    pub fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    /// Handles one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_str(&self, raw: &str) -> Option<RpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(message) => self.handle_value(message).await,
            Err(e) => {
                warn!("Rejecting unparseable JSON-RPC message: {}", e);
                Some(RpcResponse::failure(Value::Null, RpcError::parse_error(e.to_string())))
            }
        }
    }

    /// Handles one decoded JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_value(&self, message: Value) -> Option<RpcResponse> {
        let raw_id = message.get("id").cloned().unwrap_or(Value::Null);

        let request: RpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                return Some(RpcResponse::failure(raw_id, RpcError::invalid_request(e.to_string())));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            let message = format!("Unsupported jsonrpc version: {}", request.jsonrpc);
            return Some(RpcResponse::failure(raw_id, RpcError::invalid_request(message)));
        }

        debug!(method = %request.method, "Handling JSON-RPC request");
        let outcome = self.dispatch(&request.method, request.params).await;

        let id = request.id?;
        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.executor.get_tool_definitions() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::method_not_found(other)),
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            },
            "metadata": self.metadata,
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let params: CallToolParams =
            serde_json::from_value(params).map_err(|e| RpcError::invalid_params(e.to_string()))?;

        let ctx = match params.agent_id {
            Some(agent_id) => ExecutionContext::new(agent_id),
            None => ExecutionContext::default(),
        };

        let response = self
            .executor
            .execute(&params.name, params.arguments, ctx)
            .await?;

        serde_json::to_value(response).map_err(|e| RpcError::internal(e.to_string()))
    }
}
