use async_trait::async_trait;
use schemars::schema_for;
use serde_json::Value;
use tracing::{error, info};

use crate::catalog::PillRecord;
use crate::lookup::view::{failure_response, shape_response};
use crate::lookup::{LookupCriteria, LookupService};
use crate::tool::{ExecutionContext, Tool, ToolError, ToolResponse, parse_args};

pub const PILL_BUDDY_ID: &str = "pill_buddy";

/// Finds catalog pills by color, shape and optional imprint.
#[derive(Debug, Clone)]
pub struct PillBuddyTool {
    service: LookupService,
    input_schema: Value,
    output_schema: Value,
}

impl PillBuddyTool {
    pub fn new(service: LookupService) -> Self {
        let input_schema = serde_json::to_value(schema_for!(LookupCriteria)).unwrap_or(Value::Null);

        let mut output = schema_for!(Vec<PillRecord>);
        output.schema.metadata().description = Some("Returned pill information".to_string());
        let output_schema = serde_json::to_value(output).unwrap_or(Value::Null);

        Self {
            service,
            input_schema,
            output_schema,
        }
    }
}

#[async_trait]
impl Tool for PillBuddyTool {
    fn id(&self) -> &str {
        PILL_BUDDY_ID
    }

    fn name(&self) -> &str {
        "Pill Buddy"
    }

    fn description(&self) -> &str {
        "Get the pill for a certain patient"
    }

    fn input_schema(&self) -> Value {
        self.input_schema.clone()
    }

    fn output_schema(&self) -> Value {
        self.output_schema.clone()
    }

    async fn execute(
        &self,
        args: Value,
        ctx: &ExecutionContext,
    ) -> Result<ToolResponse, ToolError> {
        let criteria: LookupCriteria = parse_args(args)?;
        info!(
            agent = %ctx.agent_id,
            color = %criteria.color,
            shape = %criteria.shape,
            imprint = criteria.imprint().unwrap_or_default(),
            "Pill lookup requested"
        );

        let result = self.service.lookup(&criteria).await;

        match shape_response(&result) {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(error = %e, "Error finding matching pills");
                Ok(failure_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogStore, MockCatalog, Snapshot};
    use crate::lookup::view::{FAILURE_TEXT, NOT_FOUND_TEXT};
    use crate::tool::UiKind;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn tool() -> PillBuddyTool {
        let store = CatalogStore::from_records(vec![
            PillRecord::new("Advil", "brown", "round", "I2", "http://x/1"),
            PillRecord::new("White A", "white", "oval", "A1", "http://x/a"),
            PillRecord::new("White B", "white", "oval", "B2", "http://x/b"),
        ])
        .unwrap();
        PillBuddyTool::new(LookupService::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_execute_found() {
        let response = assert_ok!(
            tool()
                .execute(json!({"color": "white", "shape": "oval"}), &ExecutionContext::default())
                .await
        );

        assert_eq!(response.ui.kind, UiKind::Table);
        assert_eq!(response.data[0]["name"], "White A");
        assert_eq!(response.data[1]["name"], "White B");
    }

    #[tokio::test]
    async fn test_execute_not_found() {
        let response = assert_ok!(
            tool()
                .execute(
                    json!({"color": "brown", "shape": "round", "imprint": "ZZZ"}),
                    &ExecutionContext::default(),
                )
                .await
        );

        assert_eq!(response.text, NOT_FOUND_TEXT);
        assert_eq!(response.data, Value::Null);
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_shape() {
        let result = tool()
            .execute(json!({"color": "brown"}), &ExecutionContext::default())
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn test_malformed_catalog_record_yields_failure_response() {
        let snapshot: Snapshot =
            vec![Arc::new(PillRecord::new("", "brown", "round", "I2", "http://x/1"))].into();
        let mut catalog = MockCatalog::new();
        catalog.expect_snapshot().returning(move || snapshot.clone());

        let tool = PillBuddyTool::new(LookupService::new(Arc::new(catalog)));
        let response = assert_ok!(
            tool.execute(json!({"color": "brown", "shape": "round"}), &ExecutionContext::default())
                .await
        );

        assert_eq!(response.text, FAILURE_TEXT);
        assert_eq!(response.ui.kind, UiKind::Alert);
    }

    #[test]
    fn test_definition_schemas() {
        let definition = tool().to_definition();
        assert_eq!(definition.id, "pill_buddy");
        assert_eq!(definition.name, "Pill Buddy");

        let input = &definition.input_schema;
        assert_eq!(input["properties"]["color"]["description"], "color of the pill");
        assert_eq!(
            input["properties"]["imprint"]["description"],
            "imprint on the pill, which is optional"
        );
        let required: Vec<_> = input["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"color"));
        assert!(required.contains(&"shape"));
        assert!(!required.contains(&"imprint"));

        assert_eq!(definition.output_schema["type"], "array");
        assert_eq!(definition.output_schema["description"], "Returned pill information");
        assert_eq!(definition.pricing.currency, "USD");
    }
}
