//! Transport abstraction between the generation client and a backend.

use code_structure::LanguageKind;
use serde::Serialize;
use std::{future::Future, pin::Pin};
use thiserror::Error;

/// Everything a backend needs to document one file.
///
/// `prompt` and `system` are opaque to the client; they are built by
/// [`prompt::build_request`](super::prompt::build_request).
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub file_name: String,
    pub language: LanguageKind,
    pub structural_summary: serde_json::Value,
    pub prompt: String,
    pub system: String,
}

/// Failure of a single transport call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Network failure, timeout or non-success status. Worth retrying.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but without a usable structured payload.
    #[error("generation backend answered without a structured payload: {0}")]
    Malformed(String),
}

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + 'a>>;

/// Backend interface for documentation generation.
///
/// Implement this trait to plug in a provider (see [`LlmTransport`](super::llm_transport::LlmTransport))
/// or a scripted fake in tests. The returned string is the raw JSON payload.
pub trait GenerationTransport: Send + Sync {
    fn complete<'a>(&'a self, req: &'a GenerationRequest) -> TransportFuture<'a>;
}
