//! Multi-agent marketing agency runtime: a coordinator delegates to domain,
//! website, marketing and logo specialists, with per-session state and
//! artifact storage.

pub mod agents;
pub mod ai;
pub mod artifacts;
pub mod config;
pub mod session;
pub mod tools;

use agents::{AgentRegistry, Capability, CoordinatorAgent, LogoAgent, TextAgent};
use ai::{ImageBackend, ModelBackend};
use artifacts::ArtifactStore;
use config::Config;
use session::SessionRuntime;
use std::sync::Arc;

/// Wire the full agency together: artifact store, tool registry, the four
/// specialists, the coordinator, and the session runtime on top. Backends
/// are injected so tests can swap in fakes.
pub fn build_runtime(
    model: Arc<dyn ModelBackend>,
    images: Arc<dyn ImageBackend>,
    config: &Config,
) -> SessionRuntime {
    let artifacts = Arc::new(ArtifactStore::new());
    let tool_registry = Arc::new(tools::create_default_registry(images));

    let mut registry = AgentRegistry::new();
    registry.register(
        Capability::Domain,
        Arc::new(TextAgent::domain_create(model.clone(), &config.model)),
    );
    registry.register(
        Capability::Website,
        Arc::new(TextAgent::website_create(model.clone(), &config.model)),
    );
    registry.register(
        Capability::Marketing,
        Arc::new(TextAgent::marketing_create(model.clone(), &config.model)),
    );
    registry.register(
        Capability::Logo,
        Arc::new(LogoAgent::new(
            model.clone(),
            &config.model,
            tool_registry,
            artifacts.clone(),
        )),
    );

    let coordinator = Arc::new(CoordinatorAgent::new(model, &config.model, registry));
    SessionRuntime::new(coordinator, artifacts)
}
