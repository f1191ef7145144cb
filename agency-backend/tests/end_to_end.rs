//! End-to-end turns through the session runtime with fake model and image
//! backends.

use agency_backend::ai::{
    GeneratedImage, ImageBackend, Message, ModelBackend, ModelResponse,
};
use agency_backend::build_runtime;
use agency_backend::config::Config;
use agency_backend::session::{Event, EventStream, SessionRuntime, TurnStatus};
use agency_backend::tools::builtin::LOGO_ARTIFACT_NAME;
use agency_backend::tools::ToolDefinition;
use async_trait::async_trait;
use std::sync::Arc;

/// Scripted model: picks a canned response from the standing instruction it
/// was called with, so every specialist behaves plausibly.
struct FakeModel;

#[async_trait]
impl ModelBackend for FakeModel {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<ModelResponse, String> {
        // the current request is always the last history entry
        let request = history
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let content = if instruction.contains("domain naming specialist") {
            if request.contains("EcoTech") {
                "1. ecotechsolutions.com\n2. greentechhub.com\n3. ecoforward.com".to_string()
            } else {
                "1. brewandbean.com\n2. beanandbrew.com\n3. dailygrind.com".to_string()
            }
        } else if instruction.contains("website specialist") {
            format!(
                "<!DOCTYPE html><html><head><title>Home</title></head><body><p>{}</p></body></html>",
                request
            )
        } else if instruction.contains("marketing strategist") {
            format!("### Target Audience\n\nA strategy for: {}", request)
        } else if instruction.contains("logo design specialist") {
            format!("A clean modern logo for: {}", request)
        } else {
            format!("Happy to help: {}", request)
        };

        Ok(ModelResponse {
            content,
            ..Default::default()
        })
    }
}

enum ImageMode {
    Png,
    Empty,
    Error,
}

struct FakeImages(ImageMode);

#[async_trait]
impl ImageBackend for FakeImages {
    async fn synthesize(&self, _prompt: &str, _count: u32) -> Result<Vec<GeneratedImage>, String> {
        match self.0 {
            ImageMode::Png => Ok(vec![GeneratedImage {
                bytes: vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a],
                mime_type: "image/png".to_string(),
            }]),
            ImageMode::Empty => Ok(vec![]),
            ImageMode::Error => Err("image quota exceeded".to_string()),
        }
    }
}

fn test_config() -> Config {
    Config {
        project_id: None,
        location: None,
        api_key: None,
        access_token: None,
        model: "gemini-test".to_string(),
        image_model: "imagen-test".to_string(),
    }
}

fn runtime_with_images(mode: ImageMode) -> SessionRuntime {
    build_runtime(Arc::new(FakeModel), Arc::new(FakeImages(mode)), &test_config())
}

async fn drain(mut stream: EventStream) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(event) = stream.next_event().await {
        events.push(event);
    }
    events
}

/// Names of delegations in order, taken from the coordinator's tool-call
/// request events.
fn delegation_order(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ToolCallRequest { author, tool, .. } if author == "marketing_coordinator" => {
                Some(tool.clone())
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_domain_only_request_delegates_one_specialist() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session = runtime.create_session("marketing_agency", "u1");

    let events = drain(
        runtime
            .run(
                &session.id,
                "I need a domain name for my new coffee shop, Brew & Bean",
            )
            .unwrap(),
    )
    .await;

    assert_eq!(delegation_order(&events), vec!["domain_create_agent"]);

    let turns = session.turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].status, TurnStatus::Completed);

    let reply = turns[0].final_text().unwrap();
    assert!(reply.contains("## Domain Name"));
    assert!(reply.contains("brewandbean.com"));
    assert!(!reply.contains("## Website"));

    assert!(session.get_state("domain_create_output").is_some());
    assert!(session.get_state("website_create_output").is_none());
}

#[tokio::test]
async fn test_domain_then_website_passes_settled_domain() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session = runtime.create_session("marketing_agency", "u1");

    let events = drain(
        runtime
            .run(
                &session.id,
                "Find a domain and build a website for my eco-friendly startup, EcoTech Solutions",
            )
            .unwrap(),
    )
    .await;

    // Domain is settled before the website is drafted.
    assert_eq!(
        delegation_order(&events),
        vec!["domain_create_agent", "website_create_agent"]
    );

    let turns = session.turns();
    assert_eq!(turns[0].status, TurnStatus::Completed);

    let reply = turns[0].final_text().unwrap();
    assert!(reply.contains("## Domain Name"));
    assert!(reply.contains("## Website"));

    // The website specialist saw the chosen domain in its input, so the
    // generated markup references it.
    let website = session
        .get_state("website_create_output")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap();
    assert!(website.contains("ecotechsolutions.com"));
}

#[tokio::test]
async fn test_logo_success_stores_single_artifact() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session = runtime.create_session("marketing_agency", "u1");

    drain(
        runtime
            .run(&session.id, "Design a logo for my fitness app, FitTracker")
            .unwrap(),
    )
    .await;

    let artifacts = runtime.artifacts();
    let saved = artifacts.load(&session.id, LOGO_ARTIFACT_NAME).unwrap();
    assert_eq!(saved.mime_type, "image/png");
    assert_eq!(artifacts.list(&session.id), vec![LOGO_ARTIFACT_NAME]);
}

#[tokio::test]
async fn test_repeated_logo_turns_keep_one_artifact() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session = runtime.create_session("marketing_agency", "u1");

    drain(runtime.run(&session.id, "Design a logo for FitTracker").unwrap()).await;
    drain(runtime.run(&session.id, "Design another logo, bolder this time").unwrap()).await;

    assert_eq!(session.turn_count(), 2);
    assert_eq!(
        runtime.artifacts().list(&session.id),
        vec![LOGO_ARTIFACT_NAME]
    );
}

#[tokio::test]
async fn test_empty_image_generation_fails_turn_without_artifact() {
    let runtime = runtime_with_images(ImageMode::Empty);
    let session = runtime.create_session("marketing_agency", "u1");

    drain(
        runtime
            .run(&session.id, "Design a logo for my fitness app, FitTracker")
            .unwrap(),
    )
    .await;

    let turns = session.turns();
    assert_eq!(turns[0].status, TurnStatus::Failed);

    let reply = turns[0].final_text().unwrap();
    assert!(reply.contains("The logo could not be generated"));

    assert!(runtime.artifacts().list(&session.id).is_empty());
    assert!(session.get_state("logo_create_output").is_none());
}

#[tokio::test]
async fn test_image_backend_error_surfaces_in_reply() {
    let runtime = runtime_with_images(ImageMode::Error);
    let session = runtime.create_session("marketing_agency", "u1");

    drain(
        runtime
            .run(&session.id, "Design a logo for my fitness app, FitTracker")
            .unwrap(),
    )
    .await;

    let turns = session.turns();
    assert_eq!(turns[0].status, TurnStatus::Failed);
    assert!(turns[0]
        .final_text()
        .unwrap()
        .contains("image quota exceeded"));
}

#[tokio::test]
async fn test_partial_failure_still_completes_turn() {
    // Logo fails but the domain succeeds, so the turn as a whole completes
    // with a failure line for the logo section.
    let runtime = runtime_with_images(ImageMode::Empty);
    let session = runtime.create_session("marketing_agency", "u1");

    drain(
        runtime
            .run(&session.id, "I need a domain name and a logo for Brew & Bean")
            .unwrap(),
    )
    .await;

    let turns = session.turns();
    assert_eq!(turns[0].status, TurnStatus::Completed);

    let reply = turns[0].final_text().unwrap();
    assert!(reply.contains("## Domain Name"));
    assert!(reply.contains("The logo could not be generated"));
}

#[tokio::test]
async fn test_same_message_produces_same_delegation_plan() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session_a = runtime.create_session("marketing_agency", "u1");
    let session_b = runtime.create_session("marketing_agency", "u2");

    let message = "Domain, website, marketing plan and a logo for EcoTech Solutions";
    let events_a = drain(runtime.run(&session_a.id, message).unwrap()).await;
    let events_b = drain(runtime.run(&session_b.id, message).unwrap()).await;

    let expected = vec![
        "domain_create_agent",
        "website_create_agent",
        "marketing_create_agent",
        "logo_create_agent",
    ];
    assert_eq!(delegation_order(&events_a), expected);
    assert_eq!(delegation_order(&events_b), expected);
}

#[tokio::test]
async fn test_unmatched_request_is_answered_directly() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session = runtime.create_session("marketing_agency", "u1");

    let events = drain(
        runtime
            .run(&session.id, "What's the weather like today?")
            .unwrap(),
    )
    .await;

    assert!(delegation_order(&events).is_empty());

    let turns = session.turns();
    assert_eq!(turns[0].status, TurnStatus::Completed);
    assert!(turns[0].final_text().unwrap().starts_with("Happy to help"));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session_a = runtime.create_session("marketing_agency", "u1");
    let session_b = runtime.create_session("marketing_agency", "u2");

    drain(
        runtime
            .run(&session_a.id, "Design a logo for FitTracker")
            .unwrap(),
    )
    .await;

    assert!(runtime
        .artifacts()
        .load(&session_a.id, LOGO_ARTIFACT_NAME)
        .is_some());
    assert!(runtime.artifacts().list(&session_b.id).is_empty());
    assert_eq!(session_b.turn_count(), 0);
}

#[tokio::test]
async fn test_concurrent_turns_across_sessions_do_not_interfere() {
    let runtime = runtime_with_images(ImageMode::Png);
    let session_a = runtime.create_session("marketing_agency", "u1");
    let session_b = runtime.create_session("marketing_agency", "u2");

    let run_a = drain(
        runtime
            .run(&session_a.id, "Design a logo for my fitness app, FitTracker")
            .unwrap(),
    );
    let run_b = drain(
        runtime
            .run(
                &session_b.id,
                "I need a domain name for my new coffee shop, Brew & Bean",
            )
            .unwrap(),
    );
    let (events_a, events_b) = tokio::join!(run_a, run_b);

    assert_eq!(delegation_order(&events_a), vec!["logo_create_agent"]);
    assert_eq!(delegation_order(&events_b), vec!["domain_create_agent"]);

    assert_eq!(session_a.turn_count(), 1);
    assert_eq!(session_b.turn_count(), 1);
    assert_eq!(session_a.turns()[0].status, TurnStatus::Completed);
    assert_eq!(session_b.turns()[0].status, TurnStatus::Completed);

    // Artifacts and output slots stay with the session that produced them.
    assert_eq!(
        runtime.artifacts().list(&session_a.id),
        vec![LOGO_ARTIFACT_NAME]
    );
    assert!(runtime.artifacts().list(&session_b.id).is_empty());
    assert!(session_a.get_state("logo_create_output").is_some());
    assert!(session_a.get_state("domain_create_output").is_none());
    assert!(session_b.get_state("domain_create_output").is_some());
    assert!(session_b.get_state("logo_create_output").is_none());
}

#[tokio::test]
async fn test_unknown_session_is_rejected() {
    let runtime = runtime_with_images(ImageMode::Png);
    let err = runtime.run("no-such-session", "hello").unwrap_err();
    assert!(err.contains("Session not found"));
}
