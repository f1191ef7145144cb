//! Root coordinator: plans which specialists a request needs, delegates in
//! precedence order, and merges the results into one reply.

use crate::agents::intent::{classify, Capability};
use crate::agents::{Agent, AgentDescriptor, AgentRegistry, HISTORY_TURNS};
use crate::ai::{Message, ModelBackend};
use crate::session::{Event, EventSink, Session};
use crate::tools::{ToolErrorKind, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct CoordinatorAgent {
    descriptor: AgentDescriptor,
    model: Arc<dyn ModelBackend>,
    registry: AgentRegistry,
}

impl CoordinatorAgent {
    pub fn new(model: Arc<dyn ModelBackend>, model_name: &str, registry: AgentRegistry) -> Self {
        CoordinatorAgent {
            descriptor: AgentDescriptor {
                name: "marketing_coordinator".to_string(),
                model: model_name.to_string(),
                instruction: include_str!("prompts/coordinator.md").to_string(),
                output_key: None,
                tools: vec![],
            },
            model,
            registry,
        }
    }

    /// The delegation plan for a message. Deterministic: the same message
    /// always maps to the same ordered capability list.
    pub fn plan(&self, message: &str) -> Vec<Capability> {
        classify(message)
    }

    /// Build the specialist's input. Website and marketing specialists get
    /// the settled domain appended when an earlier delegation produced one.
    fn derive_input(&self, capability: Capability, request: &str, session: &Session) -> String {
        match capability {
            Capability::Website | Capability::Marketing => {
                match session.get_state("domain_create_output") {
                    Some(domain) => format!(
                        "{}\n\nChosen domain name:\n{}",
                        request,
                        domain.as_str().unwrap_or_default()
                    ),
                    None => request.to_string(),
                }
            }
            _ => request.to_string(),
        }
    }

    /// Answer a request with no specialist match directly, replaying recent
    /// turns so follow-up questions keep their context.
    async fn direct_answer(
        &self,
        session: &Session,
        request: &str,
        events: &mut EventSink,
    ) -> ToolResult {
        let mut history = session.recent_messages(HISTORY_TURNS);
        history.push(Message::user(request));
        match self
            .model
            .generate(&self.descriptor.instruction, &history, &[])
            .await
        {
            Ok(response) if !response.content.trim().is_empty() => {
                events
                    .emit(Event::text(&self.descriptor.name, &response.content))
                    .await;
                ToolResult::success(response.content)
            }
            Ok(_) => {
                let message = "A response could not be produced: the model returned no output";
                events
                    .emit(Event::text(&self.descriptor.name, message))
                    .await;
                ToolResult::failure(ToolErrorKind::EmptyResult, message)
            }
            Err(e) => {
                let message = format!("A response could not be produced: {}", e);
                events
                    .emit(Event::text(&self.descriptor.name, &message))
                    .await;
                ToolResult::failure(ToolErrorKind::GenerationError, message)
            }
        }
    }
}

#[async_trait]
impl Agent for CoordinatorAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn respond(
        &self,
        session: &Session,
        request: &str,
        events: &mut EventSink,
    ) -> ToolResult {
        let plan = self.plan(request);
        log::info!(
            "[COORDINATOR] plan for session {}: {:?}",
            session.id,
            plan
        );

        if plan.is_empty() {
            return self.direct_answer(session, request, events).await;
        }

        let mut sections: Vec<String> = Vec::new();
        let mut any_success = false;

        for capability in plan {
            let Some(agent) = self.registry.get(capability) else {
                log::warn!("[COORDINATOR] no agent registered for {:?}", capability);
                sections.push(format!(
                    "The {} could not be generated: no specialist available",
                    capability.label()
                ));
                continue;
            };

            let input = self.derive_input(capability, request, session);
            let agent_name = agent.descriptor().name.clone();

            events
                .emit(Event::tool_call_request(
                    &self.descriptor.name,
                    &agent_name,
                    json!({ "request": input }),
                ))
                .await;

            let result = agent.respond(session, &input, events).await;

            events
                .emit(Event::tool_call_result(
                    &self.descriptor.name,
                    &agent_name,
                    result.clone(),
                ))
                .await;

            if result.success {
                any_success = true;
                sections.push(format!("## {}\n\n{}", capability.title(), result.content));
            } else {
                log::warn!(
                    "[COORDINATOR] {} failed: {}",
                    agent_name,
                    result.error_message()
                );
                sections.push(format!(
                    "The {} could not be generated: {}",
                    capability.label(),
                    result.error_message()
                ));
            }
        }

        let merged = sections.join("\n\n");
        events
            .emit(Event::text(&self.descriptor.name, &merged))
            .await;

        if any_success {
            ToolResult::success(merged)
        } else {
            ToolResult::failure(ToolErrorKind::GenerationError, merged)
        }
    }
}
