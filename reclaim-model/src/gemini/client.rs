use super::config::{CLOUD_PLATFORM_SCOPE, GENAI_API_BASE, GeminiBackend, GeminiConfig};
use super::convert::{self, GenerateContentResponse};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use google_cloud_auth::credentials::{self, CacheableResource, Credentials};
use reclaim_core::{Llm, LlmRequest, LlmResponseStream, ReclaimError, Result};
use reqwest::{Client, RequestBuilder};
use std::sync::{Arc, RwLock};

enum Auth {
    ApiKey(String),
    Credentials { credentials: Credentials, cached: Arc<RwLock<Option<reqwest::header::HeaderMap>>> },
}

/// Gemini client over the REST API, in API-key (AI Studio) or
/// application-default-credential (Vertex AI) mode.
pub struct GeminiModel {
    client: Client,
    config: GeminiConfig,
    auth: Auth,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ReclaimError::Model(format!("failed to create HTTP client: {e}")))?;

        let auth = match &config.backend {
            GeminiBackend::ApiKey { api_key, .. } => Auth::ApiKey(api_key.clone()),
            GeminiBackend::Vertex { .. } => {
                let credentials = credentials::Builder::default()
                    .with_scopes([CLOUD_PLATFORM_SCOPE])
                    .build()
                    .map_err(|e| {
                        ReclaimError::Model(format!("failed to build vertex ADC credentials: {e}"))
                    })?;
                Auth::Credentials { credentials, cached: Arc::new(RwLock::new(None)) }
            }
        };

        Ok(Self { client, config, auth })
    }

    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::new(GeminiConfig::api_key(model, api_key))
    }

    pub fn vertex(
        project_id: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(GeminiConfig::vertex(model, project_id, location))
    }

    fn api_url(&self, stream: bool) -> String {
        let method = if stream { "streamGenerateContent" } else { "generateContent" };
        match &self.config.backend {
            GeminiBackend::ApiKey { base_url, .. } => {
                let base = base_url.as_deref().unwrap_or(GENAI_API_BASE);
                format!("{}/models/{}:{}", base.trim_end_matches('/'), self.config.model, method)
            }
            GeminiBackend::Vertex { project_id, location, endpoint } => {
                let base = endpoint
                    .clone()
                    .unwrap_or_else(|| format!("https://{location}-aiplatform.googleapis.com/v1"));
                format!(
                    "{}/projects/{}/locations/{}/publishers/google/models/{}:{}",
                    base.trim_end_matches('/'),
                    project_id,
                    location,
                    self.config.model,
                    method
                )
            }
        }
    }

    async fn auth_headers(&self) -> Result<Option<reqwest::header::HeaderMap>> {
        match &self.auth {
            Auth::ApiKey(_) => Ok(None),
            Auth::Credentials { credentials, cached } => {
                let cacheable = credentials.headers(Default::default()).await.map_err(|e| {
                    ReclaimError::Model(format!("failed to obtain google cloud auth headers: {e}"))
                })?;

                match cacheable {
                    CacheableResource::New { data, .. } => {
                        *cached.write().expect("auth header cache lock poisoned") = Some(data.clone());
                        Ok(Some(data))
                    }
                    CacheableResource::NotModified => cached
                        .read()
                        .expect("auth header cache lock poisoned")
                        .clone()
                        .map(Some)
                        .ok_or_else(|| {
                            ReclaimError::Model(
                                "credentials returned NotModified before any cached headers".into(),
                            )
                        }),
                }
            }
        }
    }

    async fn apply_auth(&self, mut request: RequestBuilder) -> Result<RequestBuilder> {
        if let Auth::ApiKey(key) = &self.auth {
            request = request.header("x-goog-api-key", key);
        }
        if let Some(headers) = self.auth_headers().await? {
            request = request.headers(headers);
        }
        Ok(request)
    }
}

#[async_trait]
impl Llm for GeminiModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(&self, request: LlmRequest, stream: bool) -> Result<LlmResponseStream> {
        let mut api_url = self.api_url(stream);
        if stream {
            api_url.push_str("?alt=sse");
        }
        let wire_request = convert::build_request(&request);

        let mut http = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .json(&wire_request);
        http = self.apply_auth(http).await?;

        let model = self.config.model.clone();
        let response_stream = try_stream! {
            tracing::debug!(%model, stream, "calling gemini");

            let response = http
                .send()
                .await
                .map_err(|e| ReclaimError::Model(format!("Gemini API request failed: {e}")))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                Err(ReclaimError::Model(format!("Gemini API error ({status}): {error_text}")))?;
            } else if stream {
                let mut byte_stream = response.bytes_stream();
                let mut buffer = String::new();

                while let Some(chunk_result) = byte_stream.next().await {
                    let chunk = chunk_result
                        .map_err(|e| ReclaimError::Model(format!("stream read error: {e}")))?;
                    buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(line_end) = buffer.find('\n') {
                        let line = buffer[..line_end].trim().to_string();
                        buffer = buffer[line_end + 1..].to_string();

                        if line.is_empty() {
                            continue;
                        }

                        if let Some(data) = line.strip_prefix("data: ") {
                            let parsed: GenerateContentResponse = serde_json::from_str(data)
                                .map_err(|e| {
                                    ReclaimError::Model(format!("malformed stream chunk: {e}"))
                                })?;
                            yield convert::convert_response(&parsed, true);
                        }
                    }
                }
            } else {
                let parsed: GenerateContentResponse = response
                    .json()
                    .await
                    .map_err(|e| ReclaimError::Model(format!("malformed response body: {e}")))?;
                yield convert::convert_response(&parsed, false);
            }
        };

        Ok(Box::pin(response_stream))
    }
}
