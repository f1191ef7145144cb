use std::env;

/// Default text model, matching the agency's production setup
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro-preview-05-06";
/// Default image model
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub model: String,
    pub image_model: String,
}

impl Config {
    /// Read settings once at startup. Missing backend credentials are kept as
    /// `None` rather than panicking; they surface as a failed model or image
    /// call at first use.
    pub fn from_env() -> Self {
        Self {
            project_id: non_empty(env::var("GOOGLE_CLOUD_PROJECT").ok()),
            location: non_empty(env::var("GOOGLE_CLOUD_LOCATION").ok()),
            api_key: non_empty(env::var("GOOGLE_API_KEY").ok()),
            access_token: non_empty(env::var("GOOGLE_CLOUD_ACCESS_TOKEN").ok()),
            model: env::var("AGENCY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            image_model: env::var("AGENCY_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
