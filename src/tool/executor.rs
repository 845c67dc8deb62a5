use std::sync::Arc;
use serde_json::Value;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;
use crate::tool::{ToolDefinition, ToolError, ToolRegistry, ToolResponse};

/// Caller id used when a request does not identify its agent.
pub const ANONYMOUS_AGENT: &str = "anonymous";

/// Context for tool execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique id of this call
    pub call_id: String,
    /// The agent or user that made the call
    pub agent_id: String,
}

impl ExecutionContext {
    /// Creates a context with a fresh call id.
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            call_id: Uuid::new_v4().to_string(),
            agent_id: agent_id.into(),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(ANONYMOUS_AGENT)
    }
}

/// Executes tool calls against a fixed registry.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Creates a new tool executor with the given registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Returns all tool definitions.
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry.to_tool_definitions()
    }

    /// Executes a single tool call.
    pub async fn execute(
        &self,
        tool_id: &str,
        arguments: Value,
        ctx: ExecutionContext,
    ) -> Result<ToolResponse, ToolError> {
        let tool = self
            .registry
            .get(tool_id)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(tool_id.to_string()))?;

        let span = info_span!(
            "tool_call",
            tool = tool_id,
            call_id = %ctx.call_id,
            agent = %ctx.agent_id
        );

        async move {
            debug!("Executing tool");
            tool.execute(arguments, &ctx).await
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Tool, UiKind};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio_test::assert_err;

    struct WhoAmITool;

    #[async_trait]
    impl Tool for WhoAmITool {
        fn id(&self) -> &str {
            "whoami"
        }

        fn name(&self) -> &str {
            "Who Am I"
        }

        fn description(&self) -> &str {
            "Reports the calling agent"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        fn output_schema(&self) -> Value {
            json!({"type": "null"})
        }

        async fn execute(
            &self,
            _args: Value,
            ctx: &ExecutionContext,
        ) -> Result<ToolResponse, ToolError> {
            Ok(ToolResponse::text(ctx.agent_id.clone(), "ok"))
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(WhoAmITool));
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_execute_passes_context() {
        let response = executor()
            .execute("whoami", json!({}), ExecutionContext::new("agent-7"))
            .await
            .unwrap();
        assert_eq!(response.text, "agent-7");
        assert_eq!(response.ui.kind, UiKind::Text);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let result = executor()
            .execute("missing", json!({}), ExecutionContext::default())
            .await;
        let err = assert_err!(result);
        assert!(matches!(err, ToolError::NotFound(ref id) if id == "missing"));
    }

    #[test]
    fn test_context_call_ids_are_unique() {
        let a = ExecutionContext::default();
        let b = ExecutionContext::default();
        assert_ne!(a.call_id, b.call_id);
        assert_eq!(a.agent_id, ANONYMOUS_AGENT);
    }
}
