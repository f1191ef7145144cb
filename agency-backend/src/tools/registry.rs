use crate::tools::types::{ToolContext, ToolDefinition, ToolErrorKind, ToolResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A callable capability invocable by an agent. Implementations must return
/// failures as `ToolResult` data rather than erroring out.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult;
}

/// Registry mapping tool names to implementations
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        log::debug!("[TOOLS] registered tool '{}'", name);
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. An unknown name is a `NotFound` failure, kept
    /// inside the result like every other tool-level error.
    pub async fn execute(&self, name: &str, params: Value, context: &ToolContext) -> ToolResult {
        match self.tools.get(name) {
            Some(tool) => {
                log::info!(
                    "[TOOLS] executing '{}' for session {}",
                    name,
                    context.session_id
                );
                tool.execute(params, context).await
            }
            None => ToolResult::failure(ToolErrorKind::NotFound, format!("Unknown tool: {}", name)),
        }
    }
}
