//! Base trait for the language models that drive crew agents.
//!
//! Concrete providers live under [`crate::llms::providers`]. The crew runtime
//! only ever talks to `dyn BaseLLM`, which keeps provider details (auth,
//! retries, wire format) out of agent and task code and lets tests swap in a
//! scripted model.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::usage_metrics::UsageMetrics;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    /// Role of the message sender ("system", "user", "assistant").
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Text produced by one LLM call together with the tokens it cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub usage: UsageMetrics,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while calling a language model.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No credential is available for the provider.
    #[error("{provider} API key not set. Set {env_var} in your environment or .env file.")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The HTTP request could not be sent or its body not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request (4xx).
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider kept failing (429/5xx) until retries ran out.
    #[error("{provider} API call failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        provider: &'static str,
        attempts: u32,
        last_error: String,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Interface every language-model backend implements.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Get the model identifier/name.
    fn model(&self) -> &str;

    /// Get the provider name.
    fn provider(&self) -> &str {
        "openai"
    }

    /// Send a conversation and return the assistant's reply.
    async fn call(&self, messages: Vec<LLMMessage>) -> Result<LLMResponse, LLMError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors_set_roles() {
        assert_eq!(LLMMessage::system("a").role, "system");
        assert_eq!(LLMMessage::user("b").role, "user");
        assert_eq!(LLMMessage::assistant("c").role, "assistant");
    }

    #[test]
    fn test_message_serializes_as_chat_message() {
        let json = serde_json::to_value(LLMMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_missing_api_key_message_names_env_var() {
        let err = LLMError::MissingApiKey {
            provider: "OpenAI",
            env_var: "OPENAI_API_KEY",
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
