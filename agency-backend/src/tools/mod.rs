pub mod builtin;
pub mod registry;
pub mod types;

pub use registry::{Tool, ToolRegistry};
pub use types::{
    PropertySchema, ToolContext, ToolDefinition, ToolErrorKind, ToolInputSchema, ToolResult,
};

use crate::ai::ImageBackend;
use std::sync::Arc;

/// Create a ToolRegistry with the built-in tools registered
pub fn create_default_registry(images: Arc<dyn ImageBackend>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(builtin::GenerateImageTool::new(images)));
    registry
}
