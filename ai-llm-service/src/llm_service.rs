//! Provider-agnostic entry point for structured generation.
//!
//! Construct once from an [`LlmModelConfig`], wrap in `Arc`, and share. The
//! HTTP client inside each service is reused across calls.
//!
//! # Example
//! ```no_run
//! use ai_llm_service::{LlmService, StructuredPrompt};
//! use ai_llm_service::config::default_config::config_from_env;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = LlmService::new(config_from_env()?)?;
//! let schema = serde_json::json!({ "type": "object" });
//! let prompt = StructuredPrompt {
//!     system: "You write documentation.",
//!     user: "Document add(a, b).",
//!     function_name: "submit_documentation",
//!     function_description: "Documentation per element.",
//!     schema: &schema,
//! };
//! let json = svc.generate_structured(&prompt).await?;
//! println!("{json}");
//! # Ok(()) }
//! ```

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// One structured-output request.
#[derive(Debug, Clone, Copy)]
pub struct StructuredPrompt<'a> {
    /// System instruction; empty to omit.
    pub system: &'a str,
    pub user: &'a str,
    /// Name of the forced function (OpenAI) the answer is delivered through.
    pub function_name: &'a str,
    pub function_description: &'a str,
    /// JSON schema of the answer.
    pub schema: &'a serde_json::Value,
}

/// Configured backend.
#[derive(Debug)]
pub enum LlmService {
    OpenAI(OpenAiService),
    Ollama(OllamaService),
}

impl LlmService {
    /// Builds the service matching `cfg.provider`.
    ///
    /// # Errors
    /// Config validation and client construction errors.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        cfg.validate()?;
        Ok(match cfg.provider {
            LlmProvider::OpenAI => Self::OpenAI(OpenAiService::new(cfg)?),
            LlmProvider::Ollama => Self::Ollama(OllamaService::new(cfg)?),
        })
    }

    pub fn provider(&self) -> LlmProvider {
        match self {
            Self::OpenAI(_) => LlmProvider::OpenAI,
            Self::Ollama(_) => LlmProvider::Ollama,
        }
    }

    /// Sends `prompt` and returns the raw JSON answer.
    pub async fn generate_structured(
        &self,
        prompt: &StructuredPrompt<'_>,
    ) -> Result<String, AiLlmError> {
        match self {
            Self::OpenAI(svc) => svc.generate_structured(prompt).await,
            Self::Ollama(svc) => svc.generate_structured(prompt).await,
        }
    }
}
