//! OpenAI chat-completions client with a forced function call.
//!
//! The documentation pipeline needs a JSON object, not prose, so the request
//! declares one tool whose `parameters` are the response schema and forces
//! the model to call it with `tool_choice`. The function arguments string is
//! the structured answer.
//!
//! Endpoint: `POST {endpoint}/v1/chat/completions` (non-streaming).
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::OpenAI`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::Instant;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
    llm_service::StructuredPrompt,
};

/// Thin client for the OpenAI API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if `cfg.api_key` is `None`
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(provider_error(ProviderErrorKind::InvalidProvider));
        }

        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| provider_error(ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.base_url();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(provider_error(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                provider_error(ProviderErrorKind::Decode(format!(
                    "invalid API key header: {e}"
                )))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .default_headers(headers)
            .build()?;

        let url_chat = format!("{endpoint}/v1/chat/completions");

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout().as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Performs a chat completion that must answer through `prompt.function_name`.
    ///
    /// Returns the raw JSON arguments of the function call.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` / `MissingFunctionCall`
    ///   if the answer carries no function call
    #[instrument(skip_all, fields(model = %self.cfg.model, function = %prompt.function_name))]
    pub async fn generate_structured(
        &self,
        prompt: &StructuredPrompt<'_>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_prompt(&self.cfg, prompt);

        debug!(
            prompt_len = prompt.user.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI /v1/chat/completions returned non-success status"
            );

            return Err(provider_error(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: ChatCompletionResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode /v1/chat/completions response"
            );
            provider_error(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `choices[0].message.tool_calls`"
            )))
        })?;

        let message = out
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| provider_error(ProviderErrorKind::EmptyChoices))?;

        let arguments = message
            .tool_calls
            .into_iter()
            .find(|call| call.function.name == prompt.function_name)
            .map(|call| call.function.arguments)
            .or_else(|| message.function_call.map(|f| f.arguments))
            .filter(|args| !args.trim().is_empty())
            .ok_or_else(|| provider_error(ProviderErrorKind::MissingFunctionCall))?;

        info!(
            latency_ms = started.elapsed().as_millis(),
            arguments_len = arguments.len(),
            "structured chat completion completed"
        );

        Ok(arguments)
    }
}

fn provider_error(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(LlmProvider::OpenAI, kind).into()
}

/* ===========================================================================
HTTP payloads & options
======================================================================== */

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    tools: [Tool<'a>; 1],
    tool_choice: ToolChoice<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
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
            tools: [Tool {
                kind: "function",
                function: FunctionSpec {
                    name: prompt.function_name,
                    description: prompt.function_description,
                    parameters: prompt.schema,
                },
            }],
            tool_choice: ToolChoice {
                kind: "function",
                function: FunctionName {
                    name: prompt.function_name,
                },
            },
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: FunctionSpec<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionSpec<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: FunctionName<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionName<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
    /// Legacy `functions` API answer shape.
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".into(),
            endpoint: endpoint.into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    fn prompt(schema: &serde_json::Value) -> StructuredPrompt<'_> {
        StructuredPrompt {
            system: "You write documentation.",
            user: "Document add(a, b).",
            function_name: "submit_documentation",
            function_description: "Return documentation for each element.",
            schema,
        }
    }

    #[tokio::test]
    async fn returns_forced_function_arguments() {
        let server = MockServer::start().await;
        let args = r#"{"elements":[{"name":"add","description":"Adds two numbers."}]}"#;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "tool_choice": { "type": "function", "function": { "name": "submit_documentation" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": { "name": "submit_documentation", "arguments": args }
                        }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let svc = OpenAiService::new(cfg(&server.uri())).unwrap();
        let schema = json!({ "type": "object" });
        let out = svc.generate_structured(&prompt(&schema)).await.unwrap();
        assert_eq!(out, args);
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let svc = OpenAiService::new(cfg(&server.uri())).unwrap();
        let schema = json!({ "type": "object" });
        let err = svc.generate_structured(&prompt(&schema)).await.unwrap_err();
        assert!(err.is_transient(), "{err}");
    }

    #[tokio::test]
    async fn prose_answer_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Sure! Here you go." } }]
            })))
            .mount(&server)
            .await;

        let svc = OpenAiService::new(cfg(&server.uri())).unwrap();
        let schema = json!({ "type": "object" });
        let err = svc.generate_structured(&prompt(&schema)).await.unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError { kind: ProviderErrorKind::MissingFunctionCall, .. })
        ));
    }

    #[test]
    fn rejects_missing_key() {
        let mut c = cfg("https://api.openai.com");
        c.api_key = None;
        assert!(OpenAiService::new(c).is_err());
    }
}
