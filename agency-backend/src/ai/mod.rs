pub mod gemini;
pub mod imagen;

pub use gemini::GeminiClient;
pub use imagen::VertexImagenClient;

use crate::tools::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A tool-call request emitted by the model backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What the model backend produced for one generation request
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: Option<String>,
}

/// Opaque text-generation collaborator. Accepts an instruction, conversation
/// history and a declared tool set; returns text and/or tool-call requests.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, String>;
}

/// One image payload returned by the image backend
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Opaque image-synthesis collaborator. Returns zero or more image payloads
/// or a transport/quota error.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn synthesize(&self, prompt: &str, count: u32) -> Result<Vec<GeneratedImage>, String>;
}
