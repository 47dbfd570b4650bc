//! Closure-backed tools
//!
//! Pages register extra capabilities (cart actions, item highlighting) as
//! plain functions with a fixed JSON-in, output-or-error contract.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use voice_concierge_core::{Tool, ToolError, ToolOutput};

type Handler = Arc<dyn Fn(Value) -> Result<ToolOutput, ToolError> + Send + Sync>;

#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    handler: Handler,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        (self.handler)(input)
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_tool_passes_input() {
        let tool = FnTool::new("add_to_cart", "Add an item to the cart", |input| {
            let item = input
                .get("item")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::invalid_params("item is required"))?;
            Ok(ToolOutput::text(format!("Added {}", item)))
        });

        let out = tool.execute(json!({ "item": "jollof" })).await.unwrap();
        assert_eq!(out, ToolOutput::text("Added jollof"));

        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
