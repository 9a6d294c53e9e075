//! LLM providers (OpenAI, Ollama) behind one structured-output call.
//!
//! - [`config`]: model config values and their construction from env.
//! - [`services`]: one thin HTTP client per provider.
//! - [`LlmService`]: dispatch over the configured provider.
//! - [`error_handler`]: [`AiLlmError`] with a transient/permanent split.
//! - [`telemetry`]: tracing layer for this crate's events.

pub mod config;
pub mod error_handler;
pub mod llm_service;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, Result};
pub use llm_service::{LlmService, StructuredPrompt};
