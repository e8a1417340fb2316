//! HTTP-backed completion provider.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{AugmentError, CompletionProvider, CompletionRequest, CompletionResponse, TokenUsage};
use async_trait::async_trait;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Retries after the first attempt, with exponential backoff.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Completion provider backed by a remote HTTP API with bearer-token auth.
pub struct HttpCompletionProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ApiResponse {
    text: String,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Deserialize, Default)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl HttpCompletionProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AugmentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AugmentError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AugmentError> {
        let body = ApiRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AugmentError::Timeout
                } else {
                    AugmentError::Http(e.to_string())
                }
            })?;

        match response.status() {
            status if status.is_success() => {
                let parsed: ApiResponse = response
                    .json()
                    .await
                    .map_err(|e| AugmentError::MalformedResponse(e.to_string()))?;
                if parsed.text.trim().is_empty() {
                    return Err(AugmentError::MalformedResponse(
                        "empty completion text".to_string(),
                    ));
                }
                Ok(CompletionResponse {
                    text: parsed.text,
                    usage: TokenUsage {
                        prompt_tokens: parsed.usage.prompt_tokens,
                        completion_tokens: parsed.usage.completion_tokens,
                    },
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AugmentError::Auth),
            StatusCode::TOO_MANY_REQUESTS => Err(AugmentError::RateLimited),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(AugmentError::Http(format!("HTTP {}: {}", status, text)))
            }
        }
    }

    /// Auth failures and malformed payloads won't improve on retry.
    fn is_retryable(error: &AugmentError) -> bool {
        matches!(
            error,
            AugmentError::Timeout | AugmentError::RateLimited | AugmentError::Http(_)
        )
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AugmentError> {
        let mut attempt = 0;
        loop {
            match self.attempt(&request).await {
                Ok(response) => {
                    debug!(attempt, "completion succeeded");
                    return Ok(response);
                }
                Err(error) if attempt < self.max_retries && Self::is_retryable(&error) => {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    warn!(attempt, %error, "completion attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty() && !self.endpoint.is_empty()
    }
}
