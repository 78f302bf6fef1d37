//! Task definition for crew execution.
//!
//! A task is a piece of work (description plus expected output) assigned to
//! an agent, either by id or by role. Descriptions may contain
//! `{placeholders}` that are filled from the kickoff inputs.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::agent::{Agent, AgentOutput};
use crate::llms::base_llm::LLMError;
use crate::tasks::task_output::TaskOutput;
use crate::utilities::string_utils::interpolate;

/// Represents a task to be executed.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: Uuid,
    /// Optional name for the task.
    pub name: Option<String>,
    /// Descriptive text detailing the task's purpose and execution.
    pub description: String,
    /// Clear definition of expected task outcome.
    pub expected_output: String,
    /// Role of the agent responsible for execution.
    pub agent: Option<String>,
    /// Id of the agent responsible for execution. Takes precedence over
    /// `agent` when set.
    pub agent_id: Option<Uuid>,
    /// Task output, the final result after being executed.
    pub output: Option<TaskOutput>,
    /// Start time of the last execution.
    pub start_time: Option<DateTime<Utc>>,
    /// End time of the last execution.
    pub end_time: Option<DateTime<Utc>>,

    original_description: Option<String>,
    original_expected_output: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            description: description.into(),
            expected_output: expected_output.into(),
            agent: None,
            agent_id: None,
            output: None,
            start_time: None,
            end_time: None,
            original_description: None,
            original_expected_output: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_agent(mut self, role: impl Into<String>) -> Self {
        self.agent = Some(role.into());
        self
    }

    /// Bind the task to one specific agent.
    pub fn with_agent_id(mut self, agent: &Agent) -> Self {
        self.agent = Some(agent.role.clone());
        self.agent_id = Some(agent.id);
        self
    }

    /// The prompt sent to the agent: description, then expected output.
    pub fn prompt(&self) -> String {
        format!(
            "{}\nExpected Output: {}",
            self.description, self.expected_output
        )
    }

    /// Fill `{placeholders}` in the description and expected output.
    ///
    /// Always interpolates from the original text, so calling this again with
    /// different inputs does not compound.
    pub fn interpolate_inputs(&mut self, inputs: &HashMap<String, String>) {
        let original_description = self
            .original_description
            .get_or_insert_with(|| self.description.clone());
        self.description = interpolate(original_description, inputs);

        let original_expected = self
            .original_expected_output
            .get_or_insert_with(|| self.expected_output.clone());
        self.expected_output = interpolate(original_expected, inputs);
    }

    /// Run the task through `agent`, with the outputs of earlier tasks as
    /// `context`.
    pub async fn execute(
        &mut self,
        agent: &Agent,
        context: Option<&str>,
    ) -> Result<(TaskOutput, AgentOutput), LLMError> {
        self.start_time = Some(Utc::now());

        let agent_output = agent.execute_task(&self.prompt(), context).await?;

        let mut task_output = TaskOutput::new(
            self.description.clone(),
            agent.role.clone(),
            agent_output.raw.clone(),
        );
        task_output.name = self.name.clone();
        task_output.expected_output = Some(self.expected_output.clone());
        task_output.messages = agent_output.messages.clone();

        self.end_time = Some(Utc::now());
        self.output = Some(task_output.clone());

        Ok((task_output, agent_output))
    }

    /// Wall-clock duration of the last execution, if it finished.
    pub fn execution_duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
