//! Optional external completion providers.
//!
//! Augmentation refines wording on top of a finished deterministic
//! analysis. Providers are pluggable behind [`CompletionProvider`]:
//!
//! - [`HttpCompletionProvider`]: remote completion API over HTTP
//! - [`MockCompletionProvider`]: deterministic scripted provider for tests
//! - [`NoopCompletionProvider`]: always unavailable, for disabled setups
//!
//! Any provider failure degrades the analysis gracefully and never fails
//! the run.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use http::HttpCompletionProvider;

/// Failure modes of an external completion call.
///
/// Each variant maps to a distinct degraded reason in the analysis result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AugmentError {
    #[error("completion request timed out")]
    Timeout,

    #[error("completion provider rate limited the request")]
    RateLimited,

    #[error("completion provider rejected credentials")]
    Auth,

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion transport error: {0}")]
    Http(String),
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Pluggable completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a single completion.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, AugmentError>;

    /// Whether the provider is configured and worth calling at all.
    fn is_available(&self) -> bool {
        true
    }
}

// =============================================================================
// Noop provider
// =============================================================================

/// Provider for setups with augmentation disabled. Never called by the
/// pipeline because `is_available` is false.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompletionProvider;

#[async_trait]
impl CompletionProvider for NoopCompletionProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, AugmentError> {
        Err(AugmentError::Http("augmentation disabled".to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

// =============================================================================
// Mock provider
// =============================================================================

/// Deterministic scripted provider for tests.
///
/// Returns pre-configured responses without any network calls. Prompts can
/// be scripted individually (matched by substring) or fail with a chosen
/// error.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    failure: Arc<Mutex<Option<AugmentError>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockCompletionProvider {
    /// Fixed response for every prompt.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Script a response for prompts containing `fragment`.
    pub fn add_response(&self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(fragment.into(), response.into());
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: AugmentError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Number of completed calls so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new("mock completion")
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AugmentError> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        let responses = self.responses.lock().unwrap();
        let text = responses
            .iter()
            .find(|(fragment, _)| request.prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(CompletionResponse {
            text,
            usage: TokenUsage {
                prompt_tokens: request.prompt.len() as u32 / 4,
                completion_tokens: 32,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let provider = MockCompletionProvider::new("always this");
        let response = provider
            .complete(CompletionRequest::new("any prompt"))
            .await
            .unwrap();
        assert_eq!(response.text, "always this");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_by_fragment() {
        let provider = MockCompletionProvider::default();
        provider.add_response("timeline", "refined timeline wording");

        let response = provider
            .complete(CompletionRequest::new("rewrite this timeline finding"))
            .await
            .unwrap();
        assert_eq!(response.text, "refined timeline wording");

        let fallback = provider
            .complete(CompletionRequest::new("something else"))
            .await
            .unwrap();
        assert_eq!(fallback.text, "mock completion");
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let provider = MockCompletionProvider::default();
        provider.fail_with(AugmentError::RateLimited);

        let result = provider.complete(CompletionRequest::new("prompt")).await;
        assert_eq!(result.unwrap_err(), AugmentError::RateLimited);
    }

    #[tokio::test]
    async fn test_noop_is_unavailable() {
        let provider = NoopCompletionProvider;
        assert!(!provider.is_available());
        assert!(provider
            .complete(CompletionRequest::new("prompt"))
            .await
            .is_err());
    }

    #[test]
    fn test_mock_clone_shares_call_count() {
        let provider = MockCompletionProvider::new("test");
        let clone = provider.clone();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime
            .block_on(provider.complete(CompletionRequest::new("p")))
            .unwrap();
        assert_eq!(clone.call_count(), 1);
    }
}
