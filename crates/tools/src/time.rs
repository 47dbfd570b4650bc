//! `get_current_time` tool

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use voice_concierge_core::{Clock, Tool, ToolError, ToolOutput};

/// Reports the assistant's local time and a matching greeting
///
/// Never fails: a broken clock yields `{"time":"unknown","greeting":"Hello"}`.
pub struct GetCurrentTimeTool {
    clock: Arc<dyn Clock>,
}

impl GetCurrentTimeTool {
    pub const NAME: &'static str = "get_current_time";

    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn fallback() -> Value {
        json!({ "time": "unknown", "greeting": "Hello" })
    }
}

#[async_trait]
impl Tool for GetCurrentTimeTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get the current local time and the appropriate greeting (morning, afternoon, evening)"
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
        let result = match self.clock.local_time() {
            Ok(now) => json!({
                "time": now.to_string(),
                "greeting": now.greeting().as_str(),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Clock unavailable, returning fallback time");
                Self::fallback()
            },
        };
        Ok(ToolOutput::json(result))
    }

    fn timeout_secs(&self) -> u64 {
        5
    }
}
