use crate::ai::{Message, MessageRole, ModelBackend, ModelResponse, ToolCall};
use crate::config::Config;
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Gemini `generateContent` client (Google AI Studio endpoint)
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiClient {
    /// Build a client from process configuration. A missing API key does not
    /// fail here; it surfaces as a failed generation at first use.
    pub fn new(config: &Config) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        )
    }

    fn build_request(
        instruction: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> GenerateContentRequest {
        let contents: Vec<Content> = history
            .iter()
            .map(|m| Content {
                // Gemini uses "model" for assistant turns
                role: Some(match m.role {
                    MessageRole::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                }),
                parts: vec![Part {
                    text: Some(m.content.clone()),
                    function_call: None,
                }],
            })
            .collect();

        let gemini_tools = if tools.is_empty() {
            None
        } else {
            Some(vec![GeminiTool {
                function_declarations: tools
                    .iter()
                    .map(|t| FunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: json!({
                            "type": t.input_schema.schema_type,
                            "properties": t.input_schema.properties.iter().map(|(k, v)| {
                                (k.clone(), json!({
                                    "type": v.schema_type,
                                    "description": v.description
                                }))
                            }).collect::<serde_json::Map<String, Value>>(),
                            "required": t.input_schema.required
                        }),
                    })
                    .collect(),
            }])
        };

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: Some(instruction.to_string()),
                    function_call: None,
                }],
            }),
            tools: gemini_tools,
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(
        &self,
        instruction: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "GOOGLE_API_KEY is not set; cannot reach the model backend".to_string())?;

        let request = Self::build_request(instruction, history, tools);

        log::info!(
            "[GEMINI] Sending request with model {} ({} history messages, {} tools)",
            self.model,
            history.len(),
            tools.len()
        );
        log::debug!(
            "[GEMINI] Full request:\n{}",
            serde_json::to_string_pretty(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(self.endpoint(api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Gemini API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(format!("Gemini API error: {}", error_response.error.message));
            }

            return Err(format!(
                "Gemini API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read Gemini response: {}", e))?;

        log::debug!("[GEMINI] Raw response:\n{}", response_text);

        let response_data: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("Failed to parse Gemini response: {} - body: {}", e, response_text))?;

        let candidate = response_data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| "Gemini API returned no candidates".to_string())?;

        let mut content = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();

        if let Some(candidate_content) = candidate.content {
            for (index, part) in candidate_content.parts.into_iter().enumerate() {
                if let Some(text) = part.text {
                    content.push_str(&text);
                }
                // Gemini function calls carry no ids; synthesize stable ones
                if let Some(call) = part.function_call {
                    tool_calls.push(ToolCall {
                        id: format!("{}-{}", call.name, index),
                        name: call.name,
                        arguments: call.args,
                    });
                }
            }
        }

        log::info!(
            "[GEMINI] Response - content_len: {}, tool_calls: {}, finish_reason: {:?}",
            content.len(),
            tool_calls.len(),
            candidate.finish_reason
        );

        Ok(ModelResponse {
            content,
            tool_calls,
            stop_reason: candidate.finish_reason,
        })
    }
}
