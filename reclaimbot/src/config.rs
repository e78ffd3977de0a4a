use reclaim_core::{ReclaimError, Result};

/// Process configuration, read once at startup from the environment (a
/// `.env` file is honored if present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini model id, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// When true, calls go through the Vertex AI publisher endpoint with
    /// application-default credentials; otherwise the AI Studio API with
    /// `GOOGLE_API_KEY`.
    pub use_vertex: bool,
    pub project_id: Option<String>,
    pub location: String,
    pub api_key: Option<String>,
    /// BigQuery dataset and table holding purchase history.
    pub dataset: String,
    pub table: String,
    /// Gmail address confirmation emails are sent from.
    pub sender: Option<String>,
    /// Listen address for the chat server.
    pub addr: String,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let use_vertex = env_flag("GOOGLE_GENAI_USE_VERTEXAI");
        let project_id = std::env::var("GOOGLE_CLOUD_PROJECT").ok().filter(|v| !v.is_empty());
        let api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|v| !v.is_empty());

        if use_vertex && project_id.is_none() {
            return Err(ReclaimError::Config(
                "GOOGLE_GENAI_USE_VERTEXAI is set but GOOGLE_CLOUD_PROJECT is not".to_string(),
            ));
        }
        if !use_vertex && api_key.is_none() {
            return Err(ReclaimError::Config(
                "GOOGLE_API_KEY is required unless GOOGLE_GENAI_USE_VERTEXAI is set".to_string(),
            ));
        }

        Ok(Self {
            model: env_or("MODEL", "gemini-2.5-flash"),
            use_vertex,
            project_id,
            location: env_or("GOOGLE_CLOUD_LOCATION", "us-central1"),
            api_key,
            dataset: env_or("RECLAIM_DATASET", "refund_db"),
            table: env_or("RECLAIM_TABLE", "new_purchase_history"),
            sender: std::env::var("RECLAIM_SENDER").ok().filter(|v| !v.is_empty()),
            addr: env_or("RECLAIM_ADDR", "0.0.0.0:8080"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing_accepts_common_truthy_values() {
        for value in ["true", "True", "1", "yes"] {
            // SAFETY: test-only env mutation, values are plain ASCII.
            unsafe { std::env::set_var("RECLAIM_TEST_FLAG", value) };
            assert!(env_flag("RECLAIM_TEST_FLAG"), "{value} should be truthy");
        }
        unsafe { std::env::set_var("RECLAIM_TEST_FLAG", "false") };
        assert!(!env_flag("RECLAIM_TEST_FLAG"));
        unsafe { std::env::remove_var("RECLAIM_TEST_FLAG") };
        assert!(!env_flag("RECLAIM_TEST_FLAG"));
    }

    #[test]
    fn defaults_fill_empty_values() {
        unsafe { std::env::set_var("RECLAIM_TEST_DEFAULT", "  ") };
        assert_eq!(env_or("RECLAIM_TEST_DEFAULT", "fallback"), "fallback");
        unsafe { std::env::remove_var("RECLAIM_TEST_DEFAULT") };
        assert_eq!(env_or("RECLAIM_TEST_DEFAULT", "fallback"), "fallback");
    }
}
