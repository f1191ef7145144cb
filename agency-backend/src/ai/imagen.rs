use crate::ai::{GeneratedImage, ImageBackend};
use crate::config::Config;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vertex AI Imagen `predict` client. Only Vertex AI supports image
/// generation, so this client needs project/location configuration rather
/// than a plain API key.
#[derive(Clone)]
pub struct VertexImagenClient {
    client: Client,
    model: String,
    project_id: Option<String>,
    location: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

impl VertexImagenClient {
    /// Build a client from process configuration. Missing project/location or
    /// credentials do not fail here; they surface at the first synthesize call.
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
            model: config.image_model.clone(),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn endpoint(&self) -> Result<String, String> {
        let project = self
            .project_id
            .as_deref()
            .ok_or_else(|| "GOOGLE_CLOUD_PROJECT is not set; cannot reach Vertex AI".to_string())?;
        let location = self
            .location
            .as_deref()
            .ok_or_else(|| "GOOGLE_CLOUD_LOCATION is not set; cannot reach Vertex AI".to_string())?;

        Ok(format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:predict",
            loc = location,
            proj = project,
            model = self.model
        ))
    }
}

#[async_trait]
impl ImageBackend for VertexImagenClient {
    async fn synthesize(&self, prompt: &str, count: u32) -> Result<Vec<GeneratedImage>, String> {
        let endpoint = self.endpoint()?;
        let token = self.access_token.as_deref().ok_or_else(|| {
            "GOOGLE_CLOUD_ACCESS_TOKEN is not set; cannot authenticate to Vertex AI".to_string()
        })?;

        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: count,
            },
        };

        log::info!(
            "[IMAGEN] Requesting {} image(s) from model {} (prompt: {:.80})",
            count,
            self.model,
            prompt
        );

        let response = self
            .client
            .post(&endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Imagen API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!(
                "Imagen API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let response_data: PredictResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Imagen response: {}", e))?;

        let mut images = Vec::new();
        for prediction in response_data.predictions {
            let Some(encoded) = prediction.bytes_base64_encoded else {
                continue;
            };
            let bytes = BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| format!("Failed to decode Imagen payload: {}", e))?;
            images.push(GeneratedImage {
                bytes,
                mime_type: prediction
                    .mime_type
                    .unwrap_or_else(|| "image/png".to_string()),
            });
        }

        log::info!("[IMAGEN] Received {} image payload(s)", images.len());

        Ok(images)
    }
}
