//! ASL vocabulary loaded at startup.
//!
//! The vocabulary file is a JSON object mapping words to their display
//! strings, e.g. `{"you": "you", "name": "name"}`. Each display string is
//! uppercased and the list keeps the order of the file. Tokens are matched
//! against it after uppercasing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors raised while loading the vocabulary.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file is missing or unreadable.
    #[error("ASL dataset file not found at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid JSON.
    #[error("ASL dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The root value is not an object.
    #[error("ASL dataset must be a JSON object mapping words to display strings")]
    NotAnObject,

    /// An entry maps to something other than a string.
    #[error("ASL dataset entry '{word}' must be a string")]
    NonStringEntry { word: String },
}

/// Uppercase a token for vocabulary lookup.
pub fn normalize(token: &str) -> String {
    token.to_uppercase()
}

/// The uppercased ASL vocabulary.
#[derive(Debug, Clone, Default)]
pub struct AslDataset {
    words: Vec<String>,
    index: HashSet<String>,
}

impl AslDataset {
    /// Read and parse the vocabulary file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&content)?;
        log::info!(
            "Loaded ASL dataset from {} ({} words)",
            path.display(),
            dataset.len()
        );
        Ok(dataset)
    }

    /// Parse a vocabulary document.
    pub fn from_json_str(content: &str) -> Result<Self, DatasetError> {
        let raw: Value = serde_json::from_str(content)?;
        let entries = raw.as_object().ok_or(DatasetError::NotAnObject)?;

        let words = entries
            .iter()
            .map(|(word, display)| {
                display
                    .as_str()
                    .map(normalize)
                    .ok_or_else(|| DatasetError::NonStringEntry { word: word.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_words(words))
    }

    /// Build a vocabulary from display strings, uppercasing each.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words.into_iter().map(|w| normalize(w.as_ref())).collect();
        let index = words.iter().cloned().collect();
        Self { words, index }
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All entries in file order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The first `n` entries.
    pub fn sample(&self, n: usize) -> &[String] {
        &self.words[..n.min(self.words.len())]
    }

    /// Whether the uppercased `token` is in the vocabulary.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains(&normalize(token))
    }

    /// Check every token against the vocabulary.
    pub fn validate<S: AsRef<str>>(&self, tokens: &[S]) -> ValidationReport {
        let mut results = Map::new();
        let mut valid_tokens = Vec::new();
        let mut invalid_tokens = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            let normalized = normalize(token);
            if self.index.contains(&normalized) {
                results.insert(token.to_string(), json!({"valid": true, "normalized": normalized}));
                valid_tokens.push(normalized);
            } else {
                results.insert(token.to_string(), json!({"valid": false, "normalized": null}));
                invalid_tokens.push(token.to_string());
            }
        }

        ValidationReport {
            validation_results: results,
            summary: ValidationSummary {
                total_tokens: tokens.len(),
                valid_count: valid_tokens.len(),
                invalid_count: invalid_tokens.len(),
                valid_tokens,
                invalid_tokens,
            },
        }
    }
}

/// Counts and token lists of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_tokens: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Valid tokens, uppercased, duplicates kept.
    pub valid_tokens: Vec<String>,
    /// Invalid tokens as submitted, duplicates kept.
    pub invalid_tokens: Vec<String>,
}

/// Body of the `/validate-tokens` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// `{valid, normalized}` per distinct token as submitted, in first-seen
    /// order. `normalized` is the uppercased token when valid, `null`
    /// otherwise.
    pub validation_results: Map<String, Value>,
    pub summary: ValidationSummary,
}
