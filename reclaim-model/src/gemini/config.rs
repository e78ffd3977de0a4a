/// Default endpoint for the Generative Language (AI Studio) API.
pub const GENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// OAuth scope required for Vertex AI model calls.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Backend selection for [`GeminiModel`](super::GeminiModel), decided once
/// from configuration at startup.
#[derive(Debug, Clone)]
pub enum GeminiBackend {
    /// Generative Language API authenticated with an API key.
    ApiKey { api_key: String, base_url: Option<String> },
    /// Vertex AI publisher endpoint authenticated with application-default
    /// credentials.
    Vertex { project_id: String, location: String, endpoint: Option<String> },
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub backend: GeminiBackend,
}

impl GeminiConfig {
    pub fn api_key(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            backend: GeminiBackend::ApiKey { api_key: api_key.into(), base_url: None },
        }
    }

    pub fn vertex(
        model: impl Into<String>,
        project_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            backend: GeminiBackend::Vertex {
                project_id: project_id.into(),
                location: location.into(),
                endpoint: None,
            },
        }
    }

    /// Override the endpoint base URL (used by tests against a local mock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        match &mut self.backend {
            GeminiBackend::ApiKey { base_url, .. } => *base_url = Some(url.into()),
            GeminiBackend::Vertex { endpoint, .. } => *endpoint = Some(url.into()),
        }
        self
    }
}
