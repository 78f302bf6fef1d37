//! Token accounting for a crew kickoff.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens and requests spent by the LLM calls of one kickoff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Total number of tokens used.
    pub total_tokens: i64,
    /// Number of tokens used in prompts.
    pub prompt_tokens: i64,
    /// Number of cached prompt tokens used.
    pub cached_prompt_tokens: i64,
    /// Number of tokens used in completions.
    pub completion_tokens: i64,
    /// Number of successful requests made.
    pub successful_requests: i64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metrics for a single successful request from an OpenAI-style
    /// `usage` object.
    ///
    /// Missing counters read as zero. `total_tokens` falls back to
    /// `prompt + completion` when the provider omits it.
    pub fn from_usage_value(usage: Option<&Value>) -> Self {
        let field = |key: &str| {
            usage
                .and_then(|u| u.get(key))
                .and_then(Value::as_i64)
                .unwrap_or(0)
        };

        let prompt_tokens = field("prompt_tokens");
        let completion_tokens = field("completion_tokens");
        let total_tokens = match field("total_tokens") {
            0 => prompt_tokens + completion_tokens,
            n => n,
        };
        let cached_prompt_tokens = usage
            .and_then(|u| u.get("prompt_tokens_details"))
            .and_then(|d| d.get("cached_tokens"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        Self {
            total_tokens,
            prompt_tokens,
            cached_prompt_tokens,
            completion_tokens,
            successful_requests: 1,
        }
    }

    /// Add usage metrics from another UsageMetrics object.
    pub fn add_usage_metrics(&mut self, other: &UsageMetrics) {
        self.total_tokens += other.total_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.cached_prompt_tokens += other.cached_prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.successful_requests += other.successful_requests;
    }
}
