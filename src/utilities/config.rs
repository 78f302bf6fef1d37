//! Runtime settings read from the environment.
//!
//! Values come from process environment variables. A `.env` file in the
//! working directory is read first; variables already set in the process
//! take precedence over it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::llms::providers::openai::DEFAULT_MODEL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATASET_PATH: &str = "./data/english_words.json";

/// Settings shared by the server and the CLI.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Interface the HTTP server binds to (`HOST`).
    pub host: String,
    /// HTTP port (`PORT`).
    pub port: u16,
    /// Vocabulary file (`SIGNGPT_DATASET`).
    pub dataset_path: PathBuf,
    /// LLM credential (`OPENAI_API_KEY`). Empty values count as unset.
    pub openai_api_key: Option<String>,
    /// Model name (`OPENAI_MODEL_NAME`).
    pub model: String,
    /// Base URL of an OpenAI-compatible API (`OPENAI_API_BASE`).
    pub api_base: Option<String>,
    /// Organization header (`OPENAI_ORGANIZATION`).
    pub organization: Option<String>,
    /// Agent definitions overriding the embedded ones (`SIGNGPT_AGENTS_CONFIG`).
    pub agents_config: Option<PathBuf>,
    /// Task definitions overriding the embedded ones (`SIGNGPT_TASKS_CONFIG`).
    pub tasks_config: Option<PathBuf>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dataset_path", &self.dataset_path)
            .field("api_key_configured", &self.api_key_configured())
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("agents_config", &self.agents_config)
            .field("tasks_config", &self.tasks_config)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: None,
            organization: None,
            agents_config: None,
            tasks_config: None,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Self {
        let mut vars: HashMap<String, String> = load_dotenv_file(Path::new(".env"));
        vars.extend(std::env::vars());
        Self::from_vars(&vars)
    }

    /// Build settings from a variable map. Unparseable ports fall back to the
    /// default with a warning.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            dataset_path: get("SIGNGPT_DATASET")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            openai_api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL_NAME").unwrap_or(defaults.model),
            api_base: get("OPENAI_API_BASE"),
            organization: get("OPENAI_ORGANIZATION"),
            agents_config: get("SIGNGPT_AGENTS_CONFIG").map(PathBuf::from),
            tasks_config: get("SIGNGPT_TASKS_CONFIG").map(PathBuf::from),
        }
    }

    /// Whether an LLM credential is available.
    pub fn api_key_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read variables from a dotenv file without touching the process
/// environment. A missing file yields no variables; malformed lines are
/// skipped with a warning.
pub fn load_dotenv_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(_) => return HashMap::new(),
    };
    log::debug!("Loading environment from {}", path.display());

    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            log::warn!("Skipping malformed line in {}: {}", path.display(), e);
            None
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(&HashMap::new());
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000");
        assert_eq!(settings.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert!(!settings.api_key_configured());
    }

    #[test]
    fn test_reads_known_variables() {
        let settings = Settings::from_vars(&vars(&[
            ("PORT", "9001"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL_NAME", "gpt-4o"),
            ("SIGNGPT_DATASET", "/srv/words.json"),
            ("SIGNGPT_TASKS_CONFIG", "tasks.yaml"),
        ]));
        assert_eq!(settings.port, 9001);
        assert!(settings.api_key_configured());
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.dataset_path, PathBuf::from("/srv/words.json"));
        assert_eq!(settings.tasks_config, Some(PathBuf::from("tasks.yaml")));
        assert!(settings.agents_config.is_none());
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let settings = Settings::from_vars(&vars(&[("OPENAI_API_KEY", "   ")]));
        assert!(!settings.api_key_configured());
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let settings = Settings::from_vars(&vars(&[("PORT", "eighty")]));
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let settings = Settings::from_vars(&vars(&[("OPENAI_API_KEY", "sk-secret")]));
        assert!(!format!("{:?}", settings).contains("sk-secret"));
    }

    fn dotenv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_dotenv_file() {
        let file = dotenv_file(
            "# comment\n\nOPENAI_API_KEY=\"sk-abc\"\nexport PORT=9000\nNAME='a b'\n",
        );
        let vars = load_dotenv_file(file.path());
        assert_eq!(vars.get("OPENAI_API_KEY").unwrap(), "sk-abc");
        assert_eq!(vars.get("PORT").unwrap(), "9000");
        assert_eq!(vars.get("NAME").unwrap(), "a b");
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_dotenv_inline_comment_is_not_part_of_key() {
        let file = dotenv_file("OPENAI_API_KEY=sk-abc # prod key\n");
        let vars = load_dotenv_file(file.path());
        assert_eq!(vars.get("OPENAI_API_KEY").unwrap(), "sk-abc");

        let settings = Settings::from_vars(&vars);
        assert_eq!(settings.openai_api_key.as_deref(), Some("sk-abc"));
    }

    #[test]
    fn test_missing_dotenv_file_is_empty() {
        assert!(load_dotenv_file(Path::new("/nonexistent/.env")).is_empty());
    }
}
