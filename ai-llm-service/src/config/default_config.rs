//! LLM config loaded from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = `openai` | `ollama` (default `ollama`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TEMPERATURE`  = optional sampling temperature (default `0.2`)
//! - `LLM_TIMEOUT_SECS` = optional per-request timeout (default 120)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory)
//! - `OPENAI_URL`     = base URL (default `https://api.openai.com`)
//! - `OPENAI_MODEL`   (mandatory)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt, must_var, opt_f32, opt_u32},
};

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Builds the generation config from the process environment.
///
/// # Errors
/// Any [`ConfigError`] raised while reading or validating the variables.
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    config_from_lookup(&env_opt)
}

/// Same as [`config_from_env`], reading variables through `get`.
pub fn config_from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<LlmModelConfig, AiLlmError> {
    let provider = match get("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::Ollama,
    };

    let max_tokens = opt_u32("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"))?;
    let temperature = opt_f32("LLM_TEMPERATURE", get("LLM_TEMPERATURE"))?.or(Some(DEFAULT_TEMPERATURE));
    let timeout_secs = opt_u32("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"))?.map(u64::from);

    let cfg = match provider {
        LlmProvider::OpenAI => LlmModelConfig {
            provider,
            model: must_var("OPENAI_MODEL", get("OPENAI_MODEL"))?,
            endpoint: get("OPENAI_URL").unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string()),
            api_key: Some(must_var("OPENAI_API_KEY", get("OPENAI_API_KEY"))?),
            max_tokens,
            temperature,
            top_p: None,
            timeout_secs,
        },
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: must_var("OLLAMA_MODEL", get("OLLAMA_MODEL"))?,
            endpoint: ollama_endpoint(get)?,
            api_key: None,
            max_tokens,
            temperature,
            top_p: None,
            timeout_secs,
        },
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint(get: &dyn Fn(&str) -> Option<String>) -> Result<String, AiLlmError> {
    if let Some(url) = get("OLLAMA_URL") {
        return Ok(url.trim().to_string());
    }
    if let Some(port) = get("OLLAMA_PORT") {
        let port = port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned().filter(|v| !v.trim().is_empty())
    }

    #[test]
    fn openai_from_vars() {
        let get = lookup(&[
            ("LLM_KIND", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("LLM_MAX_TOKENS", "1024"),
            ("LLM_TIMEOUT_SECS", "30"),
        ]);
        let cfg = config_from_lookup(&get).unwrap();
        assert_eq!(cfg.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.endpoint, OPENAI_DEFAULT_URL);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.max_tokens, Some(1024));
        assert_eq!(cfg.timeout_secs, Some(30));
        assert_eq!(cfg.temperature, Some(DEFAULT_TEMPERATURE));
    }

    #[test]
    fn ollama_port_fallback() {
        let get = lookup(&[("OLLAMA_PORT", "11434"), ("OLLAMA_MODEL", "llama3.1")]);
        let cfg = config_from_lookup(&get).unwrap();
        assert_eq!(cfg.provider, LlmProvider::Ollama);
        assert_eq!(cfg.endpoint, "http://localhost:11434");
    }

    #[test]
    fn missing_key_and_bad_values() {
        let get = lookup(&[("LLM_KIND", "openai"), ("OPENAI_MODEL", "gpt-4o-mini")]);
        assert!(matches!(
            config_from_lookup(&get),
            Err(AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY")))
        ));

        let get = lookup(&[("OLLAMA_PORT", "99999"), ("OLLAMA_MODEL", "m")]);
        assert!(config_from_lookup(&get).is_err());

        let get = lookup(&[("LLM_KIND", "bard")]);
        assert!(matches!(
            config_from_lookup(&get),
            Err(AiLlmError::Config(ConfigError::UnsupportedProvider(_)))
        ));
    }
}
