//! Crew projects declared in YAML.
//!
//! A project is two YAML maps: agents keyed by name (`role`, `goal`,
//! `backstory`) and tasks keyed by name (`description`, `expected_output`,
//! `agent`). Tasks run in the order they appear in the file.
//!
//! ```yaml
//! # agents.yaml
//! gloss_interpreter:
//!   role: ASL Gloss Interpreter
//!   goal: Work out what the signer means
//!   backstory: You are a certified interpreter.
//!
//! # tasks.yaml
//! interpret_glosses:
//!   description: The signer produced {words}.
//!   expected_output: A short analysis.
//!   agent: gloss_interpreter
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::agent::Agent;
use crate::crew::Crew;
use crate::llms::base_llm::BaseLLM;
use crate::task::Task;

/// Agent definitions shipped with the binary.
pub const DEFAULT_AGENTS_YAML: &str = include_str!("../../config/agents.yaml");

/// Task definitions shipped with the binary.
pub const DEFAULT_TASKS_YAML: &str = include_str!("../../config/tasks.yaml");

/// Errors raised while loading a crew project.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing failed.
    #[error("YAML error in {section} config: {source}")]
    Yaml {
        section: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    /// A section is not a map of named entries.
    #[error("{section} config must be a map of named entries")]
    NotAMap { section: &'static str },

    /// A section has no entries.
    #[error("{section} config defines no entries")]
    Empty { section: &'static str },

    /// A task refers to an agent that is not defined.
    #[error("Task '{task}' references undefined agent '{agent}'")]
    UnknownAgent { task: String, agent: String },
}

/// One agent entry of `agents.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub verbose: bool,
}

/// One task entry of `tasks.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    pub expected_output: String,
    /// Key of the agent in `agents.yaml`.
    pub agent: String,
}

/// Agent and task definitions for a crew, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewBase {
    pub agents: Vec<(String, AgentConfig)>,
    pub tasks: Vec<(String, TaskConfig)>,
}

impl CrewBase {
    /// Parse agent and task YAML documents.
    pub fn from_yaml_strs(agents_yaml: &str, tasks_yaml: &str) -> Result<Self, ConfigError> {
        let agents: Vec<_> = parse_named_entries::<AgentConfig>("agents", agents_yaml)?
            .into_iter()
            .map(|(name, agent)| {
                let agent = AgentConfig {
                    role: agent.role.trim().to_string(),
                    goal: agent.goal.trim().to_string(),
                    backstory: agent.backstory.trim().to_string(),
                    verbose: agent.verbose,
                };
                (name, agent)
            })
            .collect();

        let tasks: Vec<_> = parse_named_entries::<TaskConfig>("tasks", tasks_yaml)?
            .into_iter()
            .map(|(name, task)| {
                let task = TaskConfig {
                    description: task.description.trim().to_string(),
                    expected_output: task.expected_output.trim().to_string(),
                    agent: task.agent.trim().to_string(),
                };
                (name, task)
            })
            .collect();

        for (name, task) in &tasks {
            if !agents.iter().any(|(agent_name, _)| *agent_name == task.agent) {
                return Err(ConfigError::UnknownAgent {
                    task: name.clone(),
                    agent: task.agent.clone(),
                });
            }
        }

        Ok(Self { agents, tasks })
    }

    /// The definitions compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml_strs(DEFAULT_AGENTS_YAML, DEFAULT_TASKS_YAML)
    }

    /// Load definitions, replacing either embedded document by a file when a
    /// path is given.
    pub fn load(agents_path: Option<&Path>, tasks_path: Option<&Path>) -> Result<Self, ConfigError> {
        let agents_yaml = match agents_path {
            Some(path) => read_config(path)?,
            None => DEFAULT_AGENTS_YAML.to_string(),
        };
        let tasks_yaml = match tasks_path {
            Some(path) => read_config(path)?,
            None => DEFAULT_TASKS_YAML.to_string(),
        };
        Self::from_yaml_strs(&agents_yaml, &tasks_yaml)
    }

    /// Instantiate a fresh crew whose agents all run on `llm`.
    ///
    /// Tasks are bound to their agent's id, so interpolating a role later
    /// does not detach its tasks.
    pub fn build_crew(&self, llm: Arc<dyn BaseLLM>) -> Crew {
        let agents: Vec<Agent> = self
            .agents
            .iter()
            .map(|(_, cfg)| {
                let mut agent = Agent::new(&cfg.role, &cfg.goal, &cfg.backstory, llm.clone());
                agent.verbose = cfg.verbose;
                agent
            })
            .collect();

        let tasks = self
            .tasks
            .iter()
            .map(|(name, cfg)| {
                let task = Task::new(&cfg.description, &cfg.expected_output).with_name(name);
                match self.agents.iter().position(|(key, _)| *key == cfg.agent) {
                    Some(idx) => task.with_agent_id(&agents[idx]),
                    None => task.with_agent(&cfg.agent),
                }
            })
            .collect();

        Crew::new(agents, tasks)
    }

    /// Agent definition by its YAML key.
    pub fn agent_config(&self, name: &str) -> Option<&AgentConfig> {
        self.agents
            .iter()
            .find(|(agent_name, _)| agent_name == name)
            .map(|(_, cfg)| cfg)
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    log::debug!("Loading crew config from {}", path.display());
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a YAML map into `(key, entry)` pairs, keeping document order.
fn parse_named_entries<T>(section: &'static str, yaml: &str) -> Result<Vec<(String, T)>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let yaml_err = |source| ConfigError::Yaml { section, source };

    if yaml.trim().is_empty() {
        return Err(ConfigError::Empty { section });
    }

    let mapping = match serde_yaml::from_str::<serde_yaml::Value>(yaml).map_err(yaml_err)? {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => return Err(ConfigError::Empty { section }),
        _ => return Err(ConfigError::NotAMap { section }),
    };

    if mapping.is_empty() {
        return Err(ConfigError::Empty { section });
    }

    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = key
                .as_str()
                .ok_or(ConfigError::NotAMap { section })?
                .to_string();
            let entry = serde_yaml::from_value(value).map_err(yaml_err)?;
            Ok((name, entry))
        })
        .collect()
}
