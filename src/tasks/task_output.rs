//! Result of one task in a crew run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llms::base_llm::LLMMessage;

/// What a single task produced, and who produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Description of the task (after input interpolation).
    pub description: String,
    /// Name of the task, as declared in the task configuration.
    pub name: Option<String>,
    /// Expected output of the task.
    pub expected_output: Option<String>,
    /// First ten words of the description followed by "...".
    pub summary: Option<String>,
    /// Raw text returned by the agent.
    pub raw: String,
    /// Role of the agent that executed the task.
    pub agent: String,
    /// Conversation sent to the LLM for this task.
    #[serde(default)]
    pub messages: Vec<LLMMessage>,
}

impl TaskOutput {
    /// Create a new TaskOutput with summary auto-generated from description.
    pub fn new(description: String, agent: String, raw: String) -> Self {
        let summary = Self::generate_summary(&description);
        Self {
            description,
            name: None,
            expected_output: None,
            summary: Some(summary),
            raw,
            agent,
            messages: Vec::new(),
        }
    }

    fn generate_summary(description: &str) -> String {
        let excerpt: String = description
            .split_whitespace()
            .take(10)
            .collect::<Vec<&str>>()
            .join(" ");
        format!("{}...", excerpt)
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
