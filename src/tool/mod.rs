pub mod registry;
pub mod executor;
pub mod pill_buddy;

pub use registry::ToolRegistry;
pub use executor::{ToolExecutor, ExecutionContext};
pub use pill_buddy::PillBuddyTool;
pub use tool_types::{ToolDefinition, Pricing, ToolResponse, UiDescriptor, UiKind, ToolError};
pub use tool_trait::{Tool, DynTool, parse_args};

mod tool_types {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    /// Definition of a tool as advertised to callers.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ToolDefinition {
        /// Stable identifier used to call the tool
        pub id: String,
        /// Display name of the tool
        pub name: String,
        /// A description of what the tool does
        pub description: String,
        /// JSON Schema for the tool's input parameters
        pub input_schema: Value,
        /// JSON Schema for the tool's structured output
        pub output_schema: Value,
        /// Price charged per call
        pub pricing: Pricing,
    }

    /// Per-call pricing advertised with a tool.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Pricing {
        pub price_per_use: f64,
        pub currency: String,
    }

    impl Default for Pricing {
        fn default() -> Self {
            Self {
                price_per_use: 0.0,
                currency: "USD".to_string(),
            }
        }
    }

    /// Kind of UI the caller should render.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum UiKind {
        Table,
        Text,
        Alert,
    }

    /// A renderer-agnostic description of how to present a response.
    ///
    /// `ui_data` is pre-encoded: plain text for [`UiKind::Text`], a JSON
    /// document for tables and alerts.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UiDescriptor {
        #[serde(rename = "type")]
        pub kind: UiKind,
        #[serde(rename = "uiData")]
        pub ui_data: String,
    }

    /// The response of a tool call.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ToolResponse {
        /// Human-readable summary
        pub text: String,
        /// Structured data for machine consumption
        pub data: Value,
        /// Presentation of the result
        pub ui: UiDescriptor,
    }

    impl ToolResponse {
        /// Creates a text-only response with no data.
        pub fn text(text: impl Into<String>, ui_text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                data: Value::Null,
                ui: UiDescriptor {
                    kind: UiKind::Text,
                    ui_data: ui_text.into(),
                },
            }
        }
    }

    /// Errors that can occur when executing a tool.
    #[derive(Debug, thiserror::Error)]
    pub enum ToolError {
        #[error("Invalid arguments: {0}")]
        InvalidArguments(String),
        #[error("Execution failed: {0}")]
        ExecutionFailed(String),
        #[error("Tool not found: {0}")]
        NotFound(String),
    }
}

mod tool_trait {
    use super::executor::ExecutionContext;
    use super::tool_types::{Pricing, ToolDefinition, ToolError, ToolResponse};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    /// Trait representing a tool the service can expose.
    #[async_trait]
    pub trait Tool: Send + Sync {
        /// Returns the stable identifier of the tool.
        fn id(&self) -> &str;
        /// Returns the display name of the tool.
        fn name(&self) -> &str;
        /// Returns a description of what the tool does.
        fn description(&self) -> &str;
        /// Returns the JSON Schema for the tool's input parameters.
        fn input_schema(&self) -> Value;
        /// Returns the JSON Schema for the tool's structured output.
        fn output_schema(&self) -> Value;

        /// Returns the per-call price. Free by default.
        fn pricing(&self) -> Pricing {
            Pricing::default()
        }

        /// Executes the tool with the given arguments.
        async fn execute(
            &self,
            args: Value,
            ctx: &ExecutionContext,
        ) -> Result<ToolResponse, ToolError>;

        /// Converts the tool to its definition.
        fn to_definition(&self) -> ToolDefinition {
            ToolDefinition {
                id: self.id().to_string(),
                name: self.name().to_string(),
                description: self.description().to_string(),
                input_schema: self.input_schema(),
                output_schema: self.output_schema(),
                pricing: self.pricing(),
            }
        }
    }

    /// A type alias for a dynamic tool reference.
    pub type DynTool = Arc<dyn Tool>;

    /// Deserializes tool arguments from a JSON value.
    pub fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }
}
