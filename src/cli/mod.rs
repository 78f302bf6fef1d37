//! Command-line front end: run the SignGPT crew once and print every step.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Parser;

use crate::crews::crew_output::CrewOutput;
use crate::utilities::config::Settings;

/// Tokens used when none are given on the command line.
pub const DEFAULT_WORDS: [&str; 7] = ["YOU", "DO", "WHAT", "AND", "YOU", "NAME", "WHAT"];

/// Translate ASL gloss tokens into English with the SignGPT crew.
#[derive(Parser, Debug)]
#[command(name = "signgpt", version, about)]
pub struct Cli {
    /// ASL gloss tokens, in signing order
    #[arg(value_name = "WORD")]
    pub words: Vec<String>,

    /// Vocabulary file (JSON object of word -> display string)
    #[arg(long, env = "SIGNGPT_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Model name
    #[arg(long, env = "OPENAI_MODEL_NAME")]
    pub model: Option<String>,

    /// Agent definitions replacing the built-in ones
    #[arg(long, env = "SIGNGPT_AGENTS_CONFIG")]
    pub agents_config: Option<PathBuf>,

    /// Task definitions replacing the built-in ones
    #[arg(long, env = "SIGNGPT_TASKS_CONFIG")]
    pub tasks_config: Option<PathBuf>,

    /// Log each agent's answer as it is produced
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Tokens to translate, falling back to [`DEFAULT_WORDS`].
    pub fn words(&self) -> Vec<String> {
        if self.words.is_empty() {
            DEFAULT_WORDS.iter().map(|w| w.to_string()).collect()
        } else {
            self.words.clone()
        }
    }

    /// Apply command-line overrides on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(ref path) = self.dataset {
            settings.dataset_path = path.clone();
        }
        if let Some(ref model) = self.model {
            settings.model = model.clone();
        }
        if let Some(ref path) = self.agents_config {
            settings.agents_config = Some(path.clone());
        }
        if let Some(ref path) = self.tasks_config {
            settings.tasks_config = Some(path.clone());
        }
        settings
    }
}

/// Render the final result followed by every step's output.
pub fn format_report(output: &CrewOutput) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "Crew Result: {}", output.raw);
    let _ = writeln!(report, "\n==== All Step Outputs ====");

    for (idx, task_output) in output.tasks_output.iter().enumerate() {
        let step = idx + 1;
        let step_name = if task_output.description.is_empty() {
            format!("Step {}", step)
        } else {
            task_output.description.clone()
        };
        let agent_name = if task_output.agent.is_empty() {
            "Unknown Agent"
        } else {
            task_output.agent.as_str()
        };
        let _ = writeln!(report, "[{}] {} - Agent: {}", step, step_name, agent_name);
        let _ = writeln!(report, "Output: {}\n", task_output.raw);
    }

    report
}
