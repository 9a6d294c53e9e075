//! Documentation generation with an admission gate, retries and backoff.
//!
//! - [`GenerationClient`]: bounded-concurrency client over a [`GenerationTransport`].
//! - [`transport`]: the backend seam and the request type.
//! - [`llm_transport`]: backend built on `ai_llm_service`.
//! - [`prompt`]: request wording and the shared response schema.

pub mod llm_transport;
pub mod prompt;
pub mod transport;

use crate::config::model::GenerationConfig;
use code_structure::GeneratedDocumentation;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use transport::{GenerationRequest, GenerationTransport, TransportError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// One attempt failed in a way a retry may fix.
    #[error("transient generation failure: {0}")]
    Transient(String),

    #[error("generation failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    /// The answer arrived but cannot be decoded. Never retried.
    #[error("generation returned an unusable payload: {0}")]
    BadPayload(String),
}

/// Retry schedule of one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Applied to each attempt separately.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(cfg: &GenerationConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: cfg.base_delay(),
            attempt_timeout: cfg.attempt_timeout(),
        }
    }

    /// Delay after failed attempt `attempt` (0-based): `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

/// Generation client shared by every worker of a run.
///
/// The semaphore bounds in-flight transport calls across the whole run. A
/// permit covers exactly one attempt and is released before any backoff.
pub struct GenerationClient {
    transport: Arc<dyn GenerationTransport>,
    policy: RetryPolicy,
    sem: Arc<Semaphore>,
    attempts: AtomicUsize,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn GenerationTransport>, policy: RetryPolicy, concurrency: usize) -> Self {
        Self {
            transport,
            policy,
            sem: Arc::new(Semaphore::new(concurrency.max(1))),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Transport calls started so far (diagnostics).
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Request documentation for one file.
    ///
    /// # Errors
    /// - [`GenerationError::Exhausted`] once every attempt failed transiently;
    /// - [`GenerationError::BadPayload`] for an answer that cannot be decoded.
    #[tracing::instrument(skip_all, fields(file = %req.file_name, language = %req.language))]
    pub async fn generate(
        &self,
        req: &GenerationRequest,
    ) -> Result<GeneratedDocumentation, GenerationError> {
        let max = self.policy.max_attempts.max(1);
        let mut last = String::new();

        for attempt in 0..max {
            match self.attempt_once(req, attempt).await {
                Ok(body) => {
                    let docs = GeneratedDocumentation::from_payload(&body).map_err(|e| {
                        warn!(attempt, error = %e, "generation: payload does not decode");
                        GenerationError::BadPayload(e.to_string())
                    })?;
                    info!(attempt, elements = docs.elements.len(), "generation: payload received");
                    return Ok(docs);
                }
                Err(GenerationError::Transient(reason)) => {
                    warn!(attempt, max_attempts = max, %reason, "generation: attempt failed");
                    last = reason;
                    if attempt + 1 < max {
                        let delay = self.policy.backoff(attempt);
                        debug!(attempt, delay_ms = delay.as_millis() as u64, "generation: backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Err(GenerationError::Exhausted {
            attempts: max,
            last,
        })
    }

    async fn attempt_once(&self, req: &GenerationRequest, attempt: u32) -> Result<String, GenerationError> {
        let _permit = self
            .sem
            .acquire()
            .await
            .map_err(|_| GenerationError::Transient("admission gate closed".into()))?;
        self.attempts.fetch_add(1, Ordering::Relaxed);

        let started = Instant::now();
        let res = tokio::time::timeout(self.policy.attempt_timeout, self.transport.complete(req)).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match res {
            Ok(Ok(body)) => {
                debug!(attempt, latency_ms, bytes = body.len(), "generation: transport ok");
                Ok(body)
            }
            Ok(Err(TransportError::Unavailable(reason))) => Err(GenerationError::Transient(reason)),
            Ok(Err(TransportError::Malformed(reason))) => {
                warn!(attempt, latency_ms, %reason, "generation: malformed answer");
                Err(GenerationError::BadPayload(reason))
            }
            Err(_) => Err(GenerationError::Transient(format!(
                "attempt timed out after {}s",
                self.policy.attempt_timeout.as_secs_f32()
            ))),
        }
    }
}
