//! Main Crew struct.
//!
//! A crew is a set of agents and an ordered list of tasks. `kickoff` fills
//! the task and agent templates from the inputs, runs every task through its
//! agent and returns a [`CrewOutput`].

use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::agent::Agent;
use crate::crews::crew_output::CrewOutput;
use crate::llms::base_llm::LLMError;
use crate::process::Process;
use crate::task::Task;
use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;

/// Separator between earlier task outputs passed as context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Errors raised by a crew kickoff.
#[derive(Debug, Error)]
pub enum CrewError {
    /// The crew has nothing to run.
    #[error("Crew has no tasks to execute")]
    NoTasks,

    /// A task has no agent assigned.
    #[error("Task '{task}' has no agent assigned")]
    UnassignedTask { task: String },

    /// A task refers to an agent the crew does not have.
    #[error("Task '{task}' is assigned to unknown agent '{role}'")]
    UnknownAgent { task: String, role: String },

    /// Every task finished with empty output.
    #[error("No valid task outputs available to create crew output")]
    EmptyOutput,

    /// The language model call of a task failed.
    #[error("Task '{task}' failed: {source}")]
    Llm {
        task: String,
        #[source]
        source: LLMError,
    },
}

/// Represents a group of agents, defining how they should collaborate and the
/// tasks they should perform.
#[derive(Debug, Clone)]
pub struct Crew {
    /// Optional name for the crew.
    pub name: Option<String>,
    /// Unique identifier for the crew instance.
    pub id: Uuid,
    /// Agents part of this crew.
    pub agents: Vec<Agent>,
    /// Tasks assigned to the crew, in execution order.
    pub tasks: Vec<Task>,
    /// The process flow that the crew will follow.
    pub process: Process,
    /// Log each task's progress at info level.
    pub verbose: bool,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self {
            name: Some("crew".to_string()),
            id: Uuid::new_v4(),
            agents,
            tasks,
            process: Process::default(),
            verbose: false,
        }
    }

    /// Look up an agent by its declared role.
    pub fn get_agent(&self, role: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.declared_role() == role)
    }

    /// Index of the agent that runs `task`: by id when bound, otherwise by
    /// declared role.
    fn agent_index(&self, idx: usize) -> Result<usize, CrewError> {
        let task = &self.tasks[idx];
        let label = task_label(task, idx);

        let found = match (task.agent_id, task.agent.as_deref()) {
            (Some(id), _) => self.agents.iter().position(|a| a.id == id),
            (None, Some(role)) => self.agents.iter().position(|a| a.declared_role() == role),
            (None, None) => return Err(CrewError::UnassignedTask { task: label }),
        };

        found.ok_or_else(|| CrewError::UnknownAgent {
            task: label,
            role: task.agent.clone().unwrap_or_default(),
        })
    }

    /// Execute the crew's workflow.
    pub async fn kickoff(
        &mut self,
        inputs: &HashMap<String, String>,
    ) -> Result<CrewOutput, CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }

        let assignments = (0..self.tasks.len())
            .map(|idx| self.agent_index(idx))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Crew '{}' kickoff: {} agents, {} tasks, process={}",
            self.name.as_deref().unwrap_or("crew"),
            self.agents.len(),
            self.tasks.len(),
            self.process
        );

        self.interpolate_inputs(inputs);

        match self.process {
            Process::Sequential => self.run_sequential_process(&assignments).await,
        }
    }

    /// Interpolate inputs into tasks and agents.
    fn interpolate_inputs(&mut self, inputs: &HashMap<String, String>) {
        for task in &mut self.tasks {
            task.interpolate_inputs(inputs);
        }
        for agent in &mut self.agents {
            agent.interpolate_inputs(inputs);
        }
    }

    /// Execute tasks in order, feeding each one the outputs before it.
    /// `assignments[i]` is the index of the agent running task `i`.
    async fn run_sequential_process(
        &mut self,
        assignments: &[usize],
    ) -> Result<CrewOutput, CrewError> {
        let mut task_outputs: Vec<TaskOutput> = Vec::new();
        let mut token_usage = UsageMetrics::new();

        for (idx, (task, &agent_idx)) in self.tasks.iter_mut().zip(assignments).enumerate() {
            let label = task_label(task, idx);
            let agent = &self.agents[agent_idx];

            let context = if task_outputs.is_empty() {
                None
            } else {
                Some(
                    task_outputs
                        .iter()
                        .map(|o| o.raw.as_str())
                        .collect::<Vec<_>>()
                        .join(CONTEXT_SEPARATOR),
                )
            };

            if self.verbose {
                log::info!("[{}] Working agent: {}", label, agent.role);
            }

            let (task_output, agent_output) = task
                .execute(agent, context.as_deref())
                .await
                .map_err(|source| CrewError::Llm {
                    task: label.clone(),
                    source,
                })?;

            log::debug!(
                "Task '{}' completed by '{}' in {} ms ({} chars)",
                label,
                agent.role,
                task.execution_duration()
                    .map(|d| d.num_milliseconds())
                    .unwrap_or_default(),
                task_output.raw.len()
            );

            token_usage.add_usage_metrics(&agent_output.usage);
            task_outputs.push(task_output);
        }

        CrewOutput::from_task_outputs(task_outputs, token_usage).ok_or(CrewError::EmptyOutput)
    }
}

fn task_label(task: &Task, idx: usize) -> String {
    task.name
        .clone()
        .unwrap_or_else(|| format!("task {}", idx + 1))
}

impl std::fmt::Display for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Crew(id={}, process={}, number_of_agents={}, number_of_tasks={})",
            self.id,
            self.process,
            self.agents.len(),
            self.tasks.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::{BaseLLM, LLMMessage, LLMResponse};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Answers with the next scripted reply and records each user message.
    #[derive(Debug)]
    struct ScriptedLLM {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
        systems: Mutex<Vec<String>>,
    }

    impl ScriptedLLM {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
                systems: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BaseLLM for ScriptedLLM {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn call(&self, messages: Vec<LLMMessage>) -> Result<LLMResponse, LLMError> {
            self.systems.lock().unwrap().push(messages[0].content.clone());
            self.prompts
                .lock()
                .unwrap()
                .push(messages.last().map(|m| m.content.clone()).unwrap_or_default());
            let content = self.replies.lock().unwrap().pop().ok_or_else(|| {
                LLMError::MalformedResponse("no scripted reply left".to_string())
            })?;
            Ok(LLMResponse {
                content,
                usage: UsageMetrics {
                    total_tokens: 10,
                    prompt_tokens: 8,
                    completion_tokens: 2,
                    cached_prompt_tokens: 0,
                    successful_requests: 1,
                },
            })
        }
    }

    fn two_step_crew(llm: Arc<ScriptedLLM>) -> Crew {
        let interpreter = Agent::new("Interpreter", "Read glosses", "Fluent in ASL.", llm.clone());
        let composer = Agent::new("Composer", "Write English", "An editor.", llm);
        let tasks = vec![
            Task::new("Interpret {words}", "Meaning").with_name("interpret").with_agent("Interpreter"),
            Task::new("Compose a sentence", "Sentence").with_name("compose").with_agent("Composer"),
        ];
        Crew::new(vec![interpreter, composer], tasks)
    }

    #[tokio::test]
    async fn test_sequential_kickoff_chains_context() {
        let llm = ScriptedLLM::new(&["asking for name", "What is your name?"]);
        let mut crew = two_step_crew(llm.clone());
        let inputs = HashMap::from([("words".to_string(), "[\"YOU\",\"NAME\",\"WHAT\"]".to_string())]);

        let output = crew.kickoff(&inputs).await.unwrap();

        assert_eq!(output.raw, "What is your name?");
        assert_eq!(output.tasks_output.len(), 2);
        assert_eq!(output.tasks_output[0].agent, "Interpreter");
        assert_eq!(output.tasks_output[0].name.as_deref(), Some("interpret"));
        assert_eq!(output.token_usage.total_tokens, 20);
        assert_eq!(output.token_usage.successful_requests, 2);
        assert!(crew.tasks.iter().all(|t| t.execution_duration().is_some()));

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("Interpret [\"YOU\",\"NAME\",\"WHAT\"]"));
        assert!(!prompts[0].contains("Context:"));
        assert!(prompts[1].ends_with("Context:\nasking for name"));
    }

    #[tokio::test]
    async fn test_unknown_agent_fails() {
        let llm = ScriptedLLM::new(&["x"]);
        let agent = Agent::new("Interpreter", "g", "b", llm);
        let task = Task::new("d", "e").with_name("lost").with_agent("Nobody");
        let mut crew = Crew::new(vec![agent], vec![task]);

        let err = crew.kickoff(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, CrewError::UnknownAgent { ref role, .. } if role == "Nobody"));
    }

    #[tokio::test]
    async fn test_unassigned_task_fails() {
        let llm = ScriptedLLM::new(&["x"]);
        let agent = Agent::new("Interpreter", "g", "b", llm);
        let mut crew = Crew::new(vec![agent], vec![Task::new("d", "e")]);

        let err = crew.kickoff(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, CrewError::UnassignedTask { .. }));
    }

    #[tokio::test]
    async fn test_no_tasks_fails() {
        let mut crew = Crew::new(Vec::new(), Vec::new());
        assert!(matches!(
            crew.kickoff(&HashMap::new()).await.unwrap_err(),
            CrewError::NoTasks
        ));
    }

    #[tokio::test]
    async fn test_llm_failure_names_task() {
        let llm = ScriptedLLM::new(&[]);
        let mut crew = two_step_crew(llm);
        let err = crew.kickoff(&HashMap::new()).await.unwrap_err();
        assert!(err.to_string().starts_with("Task 'interpret' failed"));
    }

    #[tokio::test]
    async fn test_empty_outputs_fail() {
        let llm = ScriptedLLM::new(&["", "   "]);
        let mut crew = two_step_crew(llm);
        assert!(matches!(
            crew.kickoff(&HashMap::new()).await.unwrap_err(),
            CrewError::EmptyOutput
        ));
    }

    #[tokio::test]
    async fn test_interpolated_role_keeps_its_tasks() {
        let llm = ScriptedLLM::new(&["first", "second"]);
        let agent = Agent::new("Interpreter of {lang}", "g", "b", llm.clone());
        let mut crew = Crew::new(
            vec![agent],
            vec![Task::new("d", "e").with_name("t").with_agent("Interpreter of {lang}")],
        );

        let inputs = HashMap::from([("lang".to_string(), "ASL".to_string())]);
        let output = crew.kickoff(&inputs).await.unwrap();
        assert_eq!(output.tasks_output[0].agent, "Interpreter of ASL");

        let inputs = HashMap::from([("lang".to_string(), "BSL".to_string())]);
        let output = crew.kickoff(&inputs).await.unwrap();
        assert_eq!(output.raw, "second");
        assert_eq!(output.tasks_output[0].agent, "Interpreter of BSL");
    }

    #[tokio::test]
    async fn test_tasks_bound_by_id_with_duplicate_roles() {
        let llm = ScriptedLLM::new(&["a", "b"]);
        let first = Agent::new("Reviewer", "g", "First backstory.", llm.clone());
        let second = Agent::new("Reviewer", "g", "Second backstory.", llm.clone());
        let tasks = vec![
            Task::new("one", "e").with_agent_id(&second),
            Task::new("two", "e").with_agent_id(&first),
        ];
        let mut crew = Crew::new(vec![first, second], tasks);

        crew.kickoff(&HashMap::new()).await.unwrap();

        let systems = llm.systems.lock().unwrap();
        assert!(systems[0].contains("Second backstory."));
        assert!(systems[1].contains("First backstory."));
    }

    #[tokio::test]
    async fn test_unknown_agent_id_fails() {
        let llm = ScriptedLLM::new(&["x"]);
        let stranger = Agent::new("Stranger", "g", "b", llm.clone());
        let agent = Agent::new("Interpreter", "g", "b", llm);
        let task = Task::new("d", "e").with_agent_id(&stranger);
        let mut crew = Crew::new(vec![agent], vec![task]);

        let err = crew.kickoff(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, CrewError::UnknownAgent { ref role, .. } if role == "Stranger"));
    }

    #[test]
    fn test_display_and_lookup() {
        let llm = ScriptedLLM::new(&[]);
        let crew = two_step_crew(llm);
        assert!(crew.to_string().contains("number_of_tasks=2"));
        assert!(crew.get_agent("Composer").is_some());
    }
}
