//! Text-producing specialists: domain, website and marketing agents share one
//! implementation parameterized by descriptor and instruction.

use crate::agents::{Agent, AgentDescriptor, HISTORY_TURNS};
use crate::ai::{Message, ModelBackend};
use crate::session::{Event, EventSink, Session};
use crate::tools::{ToolErrorKind, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// A specialist that answers with a single model generation and records the
/// result under its output key in session state.
pub struct TextAgent {
    descriptor: AgentDescriptor,
    model: Arc<dyn ModelBackend>,
}

impl TextAgent {
    pub fn new(descriptor: AgentDescriptor, model: Arc<dyn ModelBackend>) -> Self {
        TextAgent { descriptor, model }
    }

    /// Suggests available `.com` domain candidates for a business.
    pub fn domain_create(model: Arc<dyn ModelBackend>, model_name: &str) -> Self {
        Self::new(
            AgentDescriptor {
                name: "domain_create_agent".to_string(),
                model: model_name.to_string(),
                instruction: include_str!("prompts/domain_create.md").to_string(),
                output_key: Some("domain_create_output".to_string()),
                tools: vec![],
            },
            model,
        )
    }

    /// Produces a complete single-page website for the chosen domain.
    pub fn website_create(model: Arc<dyn ModelBackend>, model_name: &str) -> Self {
        Self::new(
            AgentDescriptor {
                name: "website_create_agent".to_string(),
                model: model_name.to_string(),
                instruction: include_str!("prompts/website_create.md").to_string(),
                output_key: Some("website_create_output".to_string()),
                tools: vec![],
            },
            model,
        )
    }

    /// Drafts a full online marketing strategy.
    pub fn marketing_create(model: Arc<dyn ModelBackend>, model_name: &str) -> Self {
        Self::new(
            AgentDescriptor {
                name: "marketing_create_agent".to_string(),
                model: model_name.to_string(),
                instruction: include_str!("prompts/marketing_create.md").to_string(),
                output_key: Some("marketing_create_output".to_string()),
                tools: vec![],
            },
            model,
        )
    }
}

#[async_trait]
impl Agent for TextAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn respond(
        &self,
        session: &Session,
        request: &str,
        events: &mut EventSink,
    ) -> ToolResult {
        log::info!(
            "[AGENT] {} handling request (session {})",
            self.descriptor.name,
            session.id
        );

        let mut history = session.recent_messages(HISTORY_TURNS);
        history.push(Message::user(request));
        let response = match self
            .model
            .generate(&self.descriptor.instruction, &history, &[])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::error!("[AGENT] {} model error: {}", self.descriptor.name, e);
                return ToolResult::failure(ToolErrorKind::GenerationError, e);
            }
        };

        if response.content.trim().is_empty() {
            log::error!("[AGENT] {} produced empty output", self.descriptor.name);
            return ToolResult::failure(
                ToolErrorKind::EmptyResult,
                format!("{} produced no output", self.descriptor.name),
            );
        }

        if let Some(key) = &self.descriptor.output_key {
            session.set_state(key.clone(), json!(response.content));
        }

        events
            .emit(Event::text(&self.descriptor.name, &response.content))
            .await;

        ToolResult::success(response.content)
    }
}
