//! # SignGPT
//!
//! Turns sequences of ASL gloss tokens (e.g. `YOU NAME WHAT`) into natural
//! English by running them through a small crew of LLM agents.
//!
//! The crate provides:
//!
//! - [`dataset`] - the ASL vocabulary and token validation
//! - a minimal crew runtime ([`Agent`], [`Task`], [`Crew`], [`CrewOutput`])
//!   driven by YAML definitions ([`project`])
//! - [`llms`] - the language-model trait and an OpenAI provider
//! - [`server`] - the HTTP API, and [`cli`] - the command-line front end

pub mod agent;
pub mod cli;
pub mod crew;
pub mod crews;
pub mod dataset;
pub mod llms;
pub mod process;
pub mod project;
pub mod server;
pub mod signgpt;
pub mod task;
pub mod tasks;
pub mod types;
pub mod utilities;

pub use agent::Agent;
pub use crew::{Crew, CrewError};
pub use crews::crew_output::CrewOutput;
pub use dataset::{AslDataset, DatasetError, ValidationReport};
pub use llms::base_llm::{BaseLLM, LLMError};
pub use process::Process;
pub use signgpt::SignGptCrew;
pub use task::Task;
pub use tasks::task_output::TaskOutput;
pub use utilities::config::Settings;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
