//! Agent abstraction and the registry of specialists

pub mod coordinator;
pub mod intent;
pub mod logo;
pub mod specialized;

pub use coordinator::CoordinatorAgent;
pub use intent::Capability;
pub use logo::LogoAgent;
pub use specialized::TextAgent;

use crate::session::{EventSink, Session};
use crate::tools::ToolResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// How many prior turns are replayed into a model call's history.
pub(crate) const HISTORY_TURNS: usize = 8;

/// Static identity of an agent: its name, the model it runs on, its standing
/// instruction, where in session state it writes its output, and the tools it
/// is allowed to call.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub output_key: Option<String>,
    pub tools: Vec<String>,
}

/// One specialist in the agency. Agents respond with a `ToolResult` so the
/// coordinator can treat a delegation exactly like a tool invocation.
#[async_trait]
pub trait Agent: Send + Sync {
    fn descriptor(&self) -> &AgentDescriptor;

    async fn respond(
        &self,
        session: &Session,
        request: &str,
        events: &mut EventSink,
    ) -> ToolResult;
}

/// Capability-keyed lookup of specialists. Registration order is fixed at
/// construction; iteration follows `Capability::all()` precedence.
pub struct AgentRegistry {
    agents: HashMap<Capability, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        AgentRegistry {
            agents: HashMap::new(),
        }
    }

    pub fn register(&mut self, capability: Capability, agent: Arc<dyn Agent>) {
        log::info!(
            "[AGENTS] registered {} for capability {:?}",
            agent.descriptor().name,
            capability
        );
        self.agents.insert(capability, agent);
    }

    pub fn get(&self, capability: Capability) -> Option<Arc<dyn Agent>> {
        self.agents.get(&capability).cloned()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
