//! Logo specialist: derives an image prompt, then calls the image tool
//! exactly once per request.

use crate::agents::{Agent, AgentDescriptor};
use crate::ai::{Message, ModelBackend};
use crate::session::{Event, EventSink, Session};
use crate::tools::{ToolContext, ToolRegistry, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::artifacts::ArtifactStore;

pub struct LogoAgent {
    descriptor: AgentDescriptor,
    model: Arc<dyn ModelBackend>,
    tools: Arc<ToolRegistry>,
    artifacts: Arc<ArtifactStore>,
}

impl LogoAgent {
    pub fn new(
        model: Arc<dyn ModelBackend>,
        model_name: &str,
        tools: Arc<ToolRegistry>,
        artifacts: Arc<ArtifactStore>,
    ) -> Self {
        LogoAgent {
            descriptor: AgentDescriptor {
                name: "logo_create_agent".to_string(),
                model: model_name.to_string(),
                instruction: include_str!("prompts/logo_create.md").to_string(),
                output_key: Some("logo_create_output".to_string()),
                tools: vec!["generate_image".to_string()],
            },
            model,
            tools,
            artifacts,
        }
    }

    /// Ask the model to turn the raw request into an image prompt. A model
    /// failure degrades to using the request verbatim so the tool is still
    /// called exactly once.
    async fn derive_image_prompt(&self, request: &str) -> String {
        let history = [Message::user(request)];
        match self
            .model
            .generate(&self.descriptor.instruction, &history, &[])
            .await
        {
            Ok(response) if !response.content.trim().is_empty() => response.content,
            Ok(_) => {
                log::warn!("[AGENT] logo_create_agent got empty prompt, using request verbatim");
                request.to_string()
            }
            Err(e) => {
                log::warn!(
                    "[AGENT] logo_create_agent prompt derivation failed ({}), using request verbatim",
                    e
                );
                request.to_string()
            }
        }
    }
}

#[async_trait]
impl Agent for LogoAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn respond(
        &self,
        session: &Session,
        request: &str,
        events: &mut EventSink,
    ) -> ToolResult {
        log::info!("[AGENT] logo_create_agent handling request (session {})", session.id);

        let img_prompt = self.derive_image_prompt(request).await;
        let arguments = json!({ "img_prompt": img_prompt });

        events
            .emit(Event::tool_call_request(
                &self.descriptor.name,
                "generate_image",
                arguments.clone(),
            ))
            .await;

        let context = ToolContext::new(&session.id, self.artifacts.clone());
        let result = self.tools.execute("generate_image", arguments, &context).await;

        events
            .emit(Event::tool_call_result(
                &self.descriptor.name,
                "generate_image",
                result.clone(),
            ))
            .await;

        if result.is_failure() {
            // No placeholder output and no state write on failure.
            log::error!(
                "[AGENT] logo_create_agent tool failed: {}",
                result.error_message()
            );
            return result;
        }

        let saved = self.artifacts.list(&session.id);
        let summary = format!(
            "Logo generated from prompt: {}\n\nSession artifacts: {}",
            img_prompt.trim(),
            saved.join(", ")
        );
        if let Some(key) = &self.descriptor.output_key {
            session.set_state(key.clone(), json!(summary));
        }
        events.emit(Event::text(&self.descriptor.name, &summary)).await;

        let mut acknowledged = ToolResult::success(summary);
        acknowledged.artifact = result.artifact.clone();
        acknowledged.metadata = result.metadata.clone();
        acknowledged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GeneratedImage, ImageBackend, ModelResponse};
    use crate::tools::builtin::LOGO_ARTIFACT_NAME;
    use crate::tools::{create_default_registry, ToolDefinition, ToolErrorKind};

    struct PromptModel;

    #[async_trait]
    impl ModelBackend for PromptModel {
        async fn generate(
            &self,
            _instruction: &str,
            _history: &[Message],
            _tools: &[ToolDefinition],
        ) -> Result<ModelResponse, String> {
            Ok(ModelResponse {
                content: "A minimal geometric fox logo in orange and charcoal".to_string(),
                ..Default::default()
            })
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ModelBackend for FailingModel {
        async fn generate(
            &self,
            _instruction: &str,
            _history: &[Message],
            _tools: &[ToolDefinition],
        ) -> Result<ModelResponse, String> {
            Err("model unavailable".to_string())
        }
    }

    struct PngImages;

    #[async_trait]
    impl ImageBackend for PngImages {
        async fn synthesize(
            &self,
            _prompt: &str,
            _count: u32,
        ) -> Result<Vec<GeneratedImage>, String> {
            Ok(vec![GeneratedImage {
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
                mime_type: "image/png".to_string(),
            }])
        }
    }

    struct NoImages;

    #[async_trait]
    impl ImageBackend for NoImages {
        async fn synthesize(
            &self,
            _prompt: &str,
            _count: u32,
        ) -> Result<Vec<GeneratedImage>, String> {
            Ok(vec![])
        }
    }

    fn build_agent(
        model: Arc<dyn ModelBackend>,
        images: Arc<dyn ImageBackend>,
    ) -> (LogoAgent, Arc<ArtifactStore>) {
        let artifacts = Arc::new(ArtifactStore::new());
        let registry = Arc::new(create_default_registry(images));
        (
            LogoAgent::new(model, "gemini-test", registry, artifacts.clone()),
            artifacts,
        )
    }

    #[tokio::test]
    async fn test_success_saves_artifact_and_output_key() {
        let (agent, artifacts) = build_agent(Arc::new(PromptModel), Arc::new(PngImages));
        let session = Session::new("marketing_agency", "u1");
        let mut sink = EventSink::detached();

        let result = agent.respond(&session, "logo for FitTracker", &mut sink).await;
        assert!(result.success);
        assert_eq!(result.artifact.as_deref(), Some(LOGO_ARTIFACT_NAME));
        assert!(result.content.contains(LOGO_ARTIFACT_NAME));
        assert!(artifacts.load(&session.id, LOGO_ARTIFACT_NAME).is_some());
        assert!(session.get_state("logo_create_output").is_some());

        // request, result, then the summary text
        assert_eq!(sink.events().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_generation_propagates_without_placeholder() {
        let (agent, artifacts) = build_agent(Arc::new(PromptModel), Arc::new(NoImages));
        let session = Session::new("marketing_agency", "u1");
        let mut sink = EventSink::detached();

        let result = agent.respond(&session, "logo for FitTracker", &mut sink).await;
        assert_eq!(result.error_kind, Some(ToolErrorKind::EmptyResult));
        assert!(artifacts.list(&session.id).is_empty());
        assert!(session.get_state("logo_create_output").is_none());

        // request and failed result only
        assert_eq!(sink.events().len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_derivation_failure_falls_back_to_request() {
        let (agent, artifacts) = build_agent(Arc::new(FailingModel), Arc::new(PngImages));
        let session = Session::new("marketing_agency", "u1");
        let mut sink = EventSink::detached();

        let result = agent.respond(&session, "logo for FitTracker", &mut sink).await;
        assert!(result.success);
        assert!(artifacts.load(&session.id, LOGO_ARTIFACT_NAME).is_some());

        match &sink.events()[0] {
            Event::ToolCallRequest { arguments, .. } => {
                assert_eq!(arguments["img_prompt"], "logo for FitTracker");
            }
            other => panic!("unexpected first event: {:?}", other),
        }
    }
}
