//! OpenAI chat completions provider.
//!
//! Talks to `{base_url}/chat/completions` over `reqwest`. Transport errors,
//! rate limiting (429) and server errors (5xx) are retried with exponential
//! backoff; any other 4xx is returned to the caller immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, LLMError, LLMMessage, LLMResponse};
use crate::types::usage_metrics::UsageMetrics;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model used by the SignGPT crew.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const PROVIDER: &str = "OpenAI";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI chat completions client.
///
/// # Example
///
/// ```ignore
/// let provider = OpenAICompletion::new("gpt-4o-mini", Some(key), None);
/// let reply = provider.call(vec![LLMMessage::user("Hello")]).await?;
/// ```
#[derive(Clone)]
pub struct OpenAICompletion {
    /// Model name (e.g. "gpt-4o-mini").
    pub model: String,
    /// Bearer credential. Calls fail fast when absent.
    pub api_key: Option<String>,
    /// Custom base URL for OpenAI-compatible servers.
    pub base_url: Option<String>,
    /// Organization ID for multi-tenant access.
    pub organization: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Maximum tokens in response.
    pub max_tokens: Option<u32>,
    /// Request timeout, [`DEFAULT_TIMEOUT`] when unset.
    pub timeout: Option<Duration>,
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub initial_retry_delay: Duration,
}

impl std::fmt::Debug for OpenAICompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompletion")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAICompletion {
    /// Create a new OpenAI completion provider.
    ///
    /// An empty `api_key` is treated as missing.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url,
            organization: None,
            temperature: None,
            max_tokens: None,
            timeout: None,
            max_retries: 2,
            initial_retry_delay: Duration::from_secs(1),
        }
    }

    /// Get the API base URL without a trailing slash.
    pub fn api_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Parse a Chat Completions API response into text and usage.
    pub fn parse_completions_response(response: &Value) -> Result<LLMResponse, LLMError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| LLMError::MalformedResponse("no choices in OpenAI response".into()))?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let usage = UsageMetrics::from_usage_value(response.get("usage"));
        log::debug!(
            "OpenAI token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        );

        Ok(LLMResponse { content, usage })
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    async fn call(&self, messages: Vec<LLMMessage>) -> Result<LLMResponse, LLMError> {
        log::debug!(
            "OpenAICompletion.call: model={}, messages={}",
            self.model,
            messages.len(),
        );

        let api_key = self.api_key.as_ref().ok_or(LLMError::MissingApiKey {
            provider: PROVIDER,
            env_var: "OPENAI_API_KEY",
        })?;

        let body = self.build_request_body(&messages);
        let endpoint = format!("{}/chat/completions", self.api_base_url());

        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let mut last_error = String::new();
        let mut retry_delay = self.initial_retry_delay;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!(
                    "OpenAI API retry attempt {} after {:?}: {}",
                    attempt,
                    retry_delay,
                    last_error
                );
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let mut request = client.post(&endpoint).bearer_auth(api_key);
            if let Some(ref org) = self.organization {
                request = request.header("OpenAI-Organization", org);
            }

            let response = match request.json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = "rate limited by OpenAI API (429)".to_string();
                continue;
            }
            if status.is_server_error() {
                last_error = format!("OpenAI API server error: {}", status);
                continue;
            }

            let response_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(LLMError::Api {
                    provider: PROVIDER,
                    status: status.as_u16(),
                    body: response_text,
                });
            }

            let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
                let preview: String = response_text.chars().take(500).collect();
                LLMError::MalformedResponse(format!("{} - Body: {}", e, preview))
            })?;

            return Self::parse_completions_response(&response_json);
        }

        Err(LLMError::RetriesExhausted {
            provider: PROVIDER,
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}
