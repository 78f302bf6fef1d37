//! The SignGPT crew: ASL gloss tokens in, English text out.
//!
//! `SignGptCrew` holds the parsed crew definitions and a shared language
//! model. Every kickoff instantiates a fresh [`Crew`] from them, so runs never
//! share agent or task state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::crew::{Crew, CrewError};
use crate::crews::crew_output::CrewOutput;
use crate::dataset::AslDataset;
use crate::llms::base_llm::BaseLLM;
use crate::llms::providers::openai::OpenAICompletion;
use crate::project::{ConfigError, CrewBase};
use crate::utilities::config::Settings;

/// Kickoff input holding the gloss tokens.
pub const WORDS_INPUT: &str = "words";

/// Kickoff input holding the recognizer vocabulary.
pub const DATASET_INPUT: &str = "ASL_dataset";

/// Blueprint for SignGPT crews.
#[derive(Debug, Clone)]
pub struct SignGptCrew {
    base: CrewBase,
    llm: Arc<dyn BaseLLM>,
    verbose: bool,
}

impl SignGptCrew {
    pub fn new(base: CrewBase, llm: Arc<dyn BaseLLM>) -> Self {
        Self {
            base,
            llm,
            verbose: false,
        }
    }

    /// Build the crew from settings: YAML overrides (if any) and an OpenAI
    /// client for the configured model.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let base = CrewBase::load(
            settings.agents_config.as_deref(),
            settings.tasks_config.as_deref(),
        )?;

        let mut llm = OpenAICompletion::new(
            settings.model.clone(),
            settings.openai_api_key.clone(),
            settings.api_base.clone(),
        );
        llm.organization = settings.organization.clone();

        Ok(Self::new(base, Arc::new(llm)))
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn base(&self) -> &CrewBase {
        &self.base
    }

    /// A fresh crew instance. Verbose blueprints make every agent verbose.
    pub fn crew(&self) -> Crew {
        let mut crew = self.base.build_crew(self.llm.clone());
        crew.name = Some("signgpt".to_string());
        crew.verbose = self.verbose;
        for agent in &mut crew.agents {
            agent.verbose |= self.verbose;
        }
        crew
    }

    /// Kickoff inputs: tokens and vocabulary, each rendered as a JSON array.
    pub fn kickoff_inputs(words: &[String], dataset: &AslDataset) -> HashMap<String, String> {
        HashMap::from([
            (WORDS_INPUT.to_string(), json_list(words)),
            (DATASET_INPUT.to_string(), json_list(dataset.words())),
        ])
    }

    /// Run a fresh crew on `words`.
    pub async fn kickoff(
        &self,
        words: &[String],
        dataset: &AslDataset,
    ) -> Result<CrewOutput, CrewError> {
        let inputs = Self::kickoff_inputs(words, dataset);
        self.crew().kickoff(&inputs).await
    }
}

fn json_list(items: &[String]) -> String {
    Value::from(items.to_vec()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::{LLMError, LLMMessage, LLMResponse};
    use crate::types::usage_metrics::UsageMetrics;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct EchoLLM {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BaseLLM for EchoLLM {
        fn model(&self) -> &str {
            "echo"
        }

        async fn call(&self, messages: Vec<LLMMessage>) -> Result<LLMResponse, LLMError> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(messages[1].content.clone());
            Ok(LLMResponse {
                content: format!("step {}", prompts.len()),
                usage: UsageMetrics::from_usage_value(None),
            })
        }
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_kickoff_inputs_render_json_arrays() {
        let dataset = AslDataset::from_words(["you", "name"]);
        let inputs = SignGptCrew::kickoff_inputs(&words(&["YOU", "NAME", "WHAT"]), &dataset);
        assert_eq!(inputs[WORDS_INPUT], r#"["YOU","NAME","WHAT"]"#);
        assert_eq!(inputs[DATASET_INPUT], r#"["YOU","NAME"]"#);
    }

    #[test]
    fn test_crew_uses_embedded_definitions() {
        let blueprint = SignGptCrew::new(CrewBase::embedded().unwrap(), Arc::new(EchoLLM::default()));
        let crew = blueprint.crew();
        assert_eq!(crew.name.as_deref(), Some("signgpt"));
        assert_eq!(crew.agents.len(), 3);
        assert_eq!(crew.tasks.len(), 3);
        assert_eq!(crew.tasks[0].agent.as_deref(), Some("ASL Gloss Interpreter"));
        for task in &crew.tasks {
            assert!(crew.get_agent(task.agent.as_deref().unwrap()).is_some());
        }
    }

    #[test]
    fn test_verbose_reaches_every_agent() {
        let blueprint = SignGptCrew::new(CrewBase::embedded().unwrap(), Arc::new(EchoLLM::default()));
        assert!(blueprint.crew().agents.iter().all(|a| !a.verbose));

        let crew = blueprint.with_verbose(true).crew();
        assert!(crew.verbose);
        assert!(crew.agents.iter().all(|a| a.verbose));
    }

    #[tokio::test]
    async fn test_kickoff_runs_every_task_and_fills_inputs() {
        let llm = Arc::new(EchoLLM::default());
        let blueprint = SignGptCrew::new(CrewBase::embedded().unwrap(), llm.clone());
        let dataset = AslDataset::from_words(["you", "name", "what"]);

        let output = blueprint
            .kickoff(&words(&["YOU", "NAME", "WHAT"]), &dataset)
            .await
            .unwrap();

        assert_eq!(output.raw, "step 3");
        assert_eq!(output.tasks_output.len(), 3);
        assert_eq!(output.token_usage.successful_requests, 3);

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains(r#"["YOU","NAME","WHAT"]"#));
        assert!(prompts[0].contains(r#"["YOU","NAME","WHAT"]."#));
        assert!(!prompts[0].contains("{words}"));
        assert!(!prompts[0].contains("{ASL_dataset}"));
        assert!(prompts[2].contains("step 1\n\n---\n\nstep 2"));
    }

    #[tokio::test]
    async fn test_crews_do_not_share_state() {
        let llm = Arc::new(EchoLLM::default());
        let blueprint = SignGptCrew::new(CrewBase::embedded().unwrap(), llm);
        let dataset = AslDataset::from_words(["you"]);

        blueprint.kickoff(&words(&["YOU"]), &dataset).await.unwrap();
        let fresh = blueprint.crew();
        assert!(fresh.tasks[0].description.contains("{words}"));
        assert!(fresh.tasks.iter().all(|t| t.output.is_none()));
    }

    #[test]
    fn test_from_settings_builds_openai_crew() {
        let settings = Settings::default();
        let blueprint = SignGptCrew::from_settings(&settings).unwrap();
        assert_eq!(blueprint.base().tasks.len(), 3);
        assert_eq!(blueprint.crew().agents[0].llm.model(), settings.model);
    }
}
