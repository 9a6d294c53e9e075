use std::time::Duration;

use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32};

/// Default request timeout when the config leaves it unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for an LLM model invocation.
///
/// Built from the environment by
/// [`config_from_env`](crate::config::default_config::config_from_env) or by
/// hand, and passed by value to the service that uses it.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::LlmModelConfig;
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "qwen2.5-coder:14b".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: Some(2048),
///     temperature: Some(0.2),
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string (e.g., `"gpt-4o-mini"`, `"llama3.1"`).
    pub model: String,

    /// Base URL of the provider (path segments are appended by the services).
    pub endpoint: String,

    /// Optional API key for authentication (OpenAI).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the fields every provider depends on.
    ///
    /// # Errors
    /// [`ConfigError::EmptyModel`], [`ConfigError::InvalidFormat`] for a
    /// non-HTTP endpoint, [`ConfigError::OutOfRange`] for sampling values.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", &self.endpoint)?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }

    /// Effective HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Endpoint without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com/".into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn validates_and_normalizes() {
        let c = cfg();
        assert!(c.validate().is_ok());
        assert_eq!(c.base_url(), "https://api.openai.com");
        assert_eq!(c.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let bad = LlmModelConfig { temperature: Some(3.5), ..cfg() };
        assert!(bad.validate().is_err());
        let empty = LlmModelConfig { model: " ".into(), ..cfg() };
        assert!(empty.validate().is_err());
    }
}
