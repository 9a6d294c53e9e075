//! Ollama chat client with schema-constrained output.
//!
//! `POST {endpoint}/api/chat` with `stream=false` and `format` set to the
//! JSON schema of the expected answer; Ollama then constrains decoding so
//! `message.content` is a JSON document of that shape.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
    llm_service::StructuredPrompt,
};

/// Thin client for Ollama.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidProvider` if `cfg.provider` is not Ollama
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(provider_error(ProviderErrorKind::InvalidProvider));
        }

        let endpoint = cfg.base_url();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(provider_error(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        let url_chat = format!("{endpoint}/api/chat");

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "OllamaService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Non-streaming chat call; returns `message.content` (a JSON document).
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client errors
    /// - [`AiLlmError::Provider`] with `Decode` if the response cannot be parsed or is empty
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate_structured(
        &self,
        prompt: &StructuredPrompt<'_>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatRequest::from_prompt(&self.cfg, prompt);

        debug!(prompt_len = prompt.user.len(), "POST {}", self.url_chat);
        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, "Ollama /api/chat returned non-success status");
            return Err(provider_error(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: ChatResponse = resp.json().await.map_err(|e| {
            provider_error(ProviderErrorKind::Decode(format!(
                "serde error: {e}; ensure `stream=false` is used"
            )))
        })?;

        let content = out.message.content;
        if content.trim().is_empty() {
            return Err(provider_error(ProviderErrorKind::Decode(
                "empty `message.content`".into(),
            )));
        }

        info!(
            latency_ms = started.elapsed().as_millis(),
            content_len = content.len(),
            "structured chat completed"
        );
        Ok(content)
    }
}

fn provider_error(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(LlmProvider::Ollama, kind).into()
}

/* ==========================
HTTP payloads & options
========================== */

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

impl<'a> ChatRequest<'a> {
    fn from_prompt(cfg: &'a LlmModelConfig, prompt: &'a StructuredPrompt<'a>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: prompt.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.user,
        });

        Self {
            model: &cfg.model,
            messages,
            stream: false,
            format: prompt.schema,
            options: Some(ChatOptions {
                temperature: cfg.temperature,
                top_p: cfg.top_p,
                num_predict: cfg.max_tokens,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_schema_as_format() {
        let server = MockServer::start().await;
        let schema = json!({ "type": "object", "required": ["elements"] });
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "stream": false, "format": schema })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "message": { "role": "assistant", "content": "{\"elements\":[]}" },
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let svc = OllamaService::new(LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3.1".into(),
            endpoint: server.uri(),
            api_key: None,
            max_tokens: Some(512),
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(5),
        })
        .unwrap();

        let prompt = StructuredPrompt {
            system: "",
            user: "Document this file.",
            function_name: "submit_documentation",
            function_description: "",
            schema: &schema,
        };
        assert_eq!(svc.generate_structured(&prompt).await.unwrap(), "{\"elements\":[]}");
    }
}
