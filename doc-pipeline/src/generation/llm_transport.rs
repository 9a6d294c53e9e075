//! [`GenerationTransport`] backed by `ai_llm_service`.

use super::{
    prompt::{FUNCTION_DESCRIPTION, FUNCTION_NAME, documentation_schema},
    transport::{GenerationRequest, GenerationTransport, TransportError, TransportFuture},
};
use ai_llm_service::{AiLlmError, LlmService, StructuredPrompt};
use std::sync::Arc;
use tracing::debug;

/// Sends requests through a shared [`LlmService`].
#[derive(Debug, Clone)]
pub struct LlmTransport {
    service: Arc<LlmService>,
    schema: serde_json::Value,
}

impl LlmTransport {
    pub fn new(service: Arc<LlmService>) -> Self {
        Self {
            service,
            schema: documentation_schema(),
        }
    }
}

impl GenerationTransport for LlmTransport {
    fn complete<'a>(&'a self, req: &'a GenerationRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            let prompt = StructuredPrompt {
                system: &req.system,
                user: &req.prompt,
                function_name: FUNCTION_NAME,
                function_description: FUNCTION_DESCRIPTION,
                schema: &self.schema,
            };
            debug!(
                file = %req.file_name,
                provider = %self.service.provider(),
                "llm_transport: sending request"
            );
            self.service
                .generate_structured(&prompt)
                .await
                .map_err(map_llm_error)
        })
    }
}

fn map_llm_error(err: AiLlmError) -> TransportError {
    if err.is_transient() {
        TransportError::Unavailable(err.to_string())
    } else {
        TransportError::Malformed(err.to_string())
    }
}
