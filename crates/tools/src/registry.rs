//! Tool Registry
//!
//! Per-session tool set. Registration keeps the first tool seen under a
//! name; later duplicates are ignored.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use voice_concierge_core::{Tool, ToolError, ToolExecutor, ToolOutput, ToolSchema};

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, for stable listings
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool; returns `false` if the name was already taken
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> bool {
        self.register_boxed(Arc::new(tool))
    }

    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            tracing::debug!(tool = %name, "Tool already registered, keeping first");
            return false;
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    /// Execute a tool with its own timeout
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("Tool not found: {}", name)))?;

        let timeout_secs = tool.timeout_secs();
        tracing::debug!(tool = name, timeout_secs, "Executing tool");

        let result = match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            tool.execute(arguments),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(ToolError::timeout(name, timeout_secs)),
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            "voice_concierge_tool_calls_total",
            "tool" => name.to_string(),
            "outcome" => outcome
        )
        .increment(1);

        if let Err(e) = &result {
            tracing::warn!(tool = name, error = %e, "Tool call failed");
        }
        result
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    fn get_tool(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|t| t.schema())
    }
}

/// Build the registry for one session
///
/// Page tools go in first so a page may shadow a built-in by name.
pub fn create_session_registry(
    page_tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    builtins: impl IntoIterator<Item = Arc<dyn Tool>>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in page_tools.into_iter().chain(builtins) {
        registry.register_boxed(tool);
    }
    registry
}
