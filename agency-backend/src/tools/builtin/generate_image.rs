use crate::ai::ImageBackend;
use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolErrorKind, ToolInputSchema, ToolResult,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Deterministic per-session artifact name for generated logos
pub const LOGO_ARTIFACT_NAME: &str = "image.png";

/// Side-effecting image generation tool: synthesize, validate, persist into
/// the artifact store, acknowledge. Every failure is returned as data; the
/// image backend's errors never cross this boundary.
pub struct GenerateImageTool {
    definition: ToolDefinition,
    images: Arc<dyn ImageBackend>,
}

impl GenerateImageTool {
    pub fn new(images: Arc<dyn ImageBackend>) -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "img_prompt".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Text prompt describing the image to generate".to_string(),
                default: None,
                enum_values: None,
            },
        );
        properties.insert(
            "number_of_images".to_string(),
            PropertySchema {
                schema_type: "integer".to_string(),
                description: "How many images to request from the backend (default: 1)"
                    .to_string(),
                default: Some(json!(1)),
                enum_values: None,
            },
        );

        GenerateImageTool {
            definition: ToolDefinition {
                name: "generate_image".to_string(),
                description: "Generate an image from a text prompt and store it as a session artifact.".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["img_prompt".to_string()],
                },
                side_effecting: true,
            },
            images,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateImageParams {
    img_prompt: String,
    number_of_images: Option<u32>,
}

#[async_trait]
impl Tool for GenerateImageTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: GenerateImageParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return ToolResult::failure(
                    ToolErrorKind::ValidationError,
                    format!("Invalid parameters: {}", e),
                )
            }
        };

        if params.img_prompt.trim().is_empty() {
            return ToolResult::failure(
                ToolErrorKind::ValidationError,
                "img_prompt must not be empty",
            );
        }

        let count = params.number_of_images.unwrap_or(1).max(1);

        let generated = match self.images.synthesize(&params.img_prompt, count).await {
            Ok(images) => images,
            Err(e) => {
                log::error!("[TOOL] generate_image backend error: {}", e);
                return ToolResult::failure(ToolErrorKind::GenerationError, e);
            }
        };

        if generated.is_empty() {
            log::error!("[TOOL] generate_image produced no images");
            return ToolResult::failure(ToolErrorKind::EmptyResult, "No images generated");
        }

        let image = &generated[0];
        let size = image.bytes.len();

        context.artifacts.save(
            &context.session_id,
            LOGO_ARTIFACT_NAME,
            image.bytes.clone(),
            &image.mime_type,
        );

        // Best-effort read-back. The write already succeeded, so a miss here
        // is an observability signal, not a failure.
        match context.artifacts.load(&context.session_id, LOGO_ARTIFACT_NAME) {
            Some(saved) => log::debug!(
                "[TOOL] verified artifact '{}' ({} bytes) for session {}",
                LOGO_ARTIFACT_NAME,
                saved.len(),
                context.session_id
            ),
            None => log::warn!(
                "[TOOL] could not verify artifact '{}' after save for session {}",
                LOGO_ARTIFACT_NAME,
                context.session_id
            ),
        }

        ToolResult::success(format!(
            "Image generated successfully and stored in artifacts as '{}'.",
            LOGO_ARTIFACT_NAME
        ))
        .with_artifact(LOGO_ARTIFACT_NAME)
        .with_metadata(json!({
            "filename": LOGO_ARTIFACT_NAME,
            "mime_type": image.mime_type,
            "image_size_bytes": size,
            "images_returned": generated.len()
        }))
    }
}
