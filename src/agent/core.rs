//! Agent: a role-playing persona backed by a language model.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::llms::base_llm::{BaseLLM, LLMError, LLMMessage};
use crate::types::usage_metrics::UsageMetrics;
use crate::utilities::string_utils::interpolate;

/// What an agent returned for one task.
#[derive(Debug, Clone, Default)]
pub struct AgentOutput {
    /// Final text of the agent.
    pub raw: String,
    /// Messages sent to the LLM, followed by the assistant's reply.
    pub messages: Vec<LLMMessage>,
    /// Tokens spent on the call.
    pub usage: UsageMetrics,
}

/// An agent with a role, a goal and a backstory, answering through `llm`.
#[derive(Clone)]
pub struct Agent {
    /// Unique identifier for the agent.
    pub id: Uuid,
    /// Role of the agent. Tasks refer to agents by role.
    pub role: String,
    /// Objective of the agent.
    pub goal: String,
    /// Backstory of the agent.
    pub backstory: String,
    /// Log prompts and answers at info level.
    pub verbose: bool,
    /// Language model that runs the agent.
    pub llm: Arc<dyn BaseLLM>,

    original_role: Option<String>,
    original_goal: Option<String>,
    original_backstory: Option<String>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("llm", &self.llm.model())
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<dyn BaseLLM>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            verbose: false,
            llm,
            original_role: None,
            original_goal: None,
            original_backstory: None,
        }
    }

    /// System prompt describing the persona.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }

    /// Execute a task prompt, with optional context from earlier tasks.
    pub async fn execute_task(
        &self,
        task_prompt: &str,
        context: Option<&str>,
    ) -> Result<AgentOutput, LLMError> {
        log::debug!("Agent '{}' executing task: {}", self.role, task_prompt);

        let user_prompt = match context {
            Some(ctx) if !ctx.is_empty() => format!("{}\n\nContext:\n{}", task_prompt, ctx),
            _ => task_prompt.to_string(),
        };

        let mut messages = vec![
            LLMMessage::system(self.system_prompt()),
            LLMMessage::user(user_prompt),
        ];

        let response = self.llm.call(messages.clone()).await?;
        let raw = response.content.trim().to_string();

        if self.verbose {
            log::info!("[{}] Final Answer: {}", self.role, raw);
        }

        messages.push(LLMMessage::assistant(raw.clone()));

        Ok(AgentOutput {
            raw,
            messages,
            usage: response.usage,
        })
    }

    /// Role as declared, before any input interpolation.
    pub fn declared_role(&self) -> &str {
        self.original_role.as_deref().unwrap_or(&self.role)
    }

    /// Interpolate inputs into the agent role, goal, and backstory.
    pub fn interpolate_inputs(&mut self, inputs: &HashMap<String, String>) {
        let role = self.original_role.get_or_insert_with(|| self.role.clone());
        self.role = interpolate(role, inputs);

        let goal = self.original_goal.get_or_insert_with(|| self.goal.clone());
        self.goal = interpolate(goal, inputs);

        let backstory = self
            .original_backstory
            .get_or_insert_with(|| self.backstory.clone());
        self.backstory = interpolate(backstory, inputs);
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Agent(role={}, goal={}, backstory={})",
            self.role, self.goal, self.backstory
        )
    }
}
