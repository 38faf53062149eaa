//! Provider configuration read from the environment

use super::Sampling;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the chat completions provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL, without the `/chat/completions` suffix
    pub base_url: String,
    pub model: String,
    pub sampling: Sampling,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            sampling: Sampling::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f32>().ok());

        Self {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: lookup("INQUIRY_MODEL").unwrap_or(defaults.model),
            sampling: Sampling {
                temperature: parsed("INQUIRY_TEMPERATURE").or(defaults.sampling.temperature),
                top_p: parsed("INQUIRY_TOP_P").or(defaults.sampling.top_p),
                max_tokens: lookup("INQUIRY_MAX_TOKENS").and_then(|v| v.trim().parse().ok()),
            },
            request_timeout: lookup("INQUIRY_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }
}
