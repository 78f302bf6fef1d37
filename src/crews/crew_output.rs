//! Crew output representation.
//!
//! The result of a kickoff: the final answer, every task's output in
//! execution order, and the tokens spent producing them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tasks::task_output::TaskOutput;
use crate::types::usage_metrics::UsageMetrics;

/// Class that represents the result of a crew.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Raw output of the last task that produced text.
    pub raw: String,
    /// Output of each task.
    pub tasks_output: Vec<TaskOutput>,
    /// Processed token summary.
    pub token_usage: UsageMetrics,
}

impl CrewOutput {
    /// Build a crew output from the task outputs of a finished run.
    ///
    /// Returns `None` when no task produced non-empty text.
    pub fn from_task_outputs(tasks_output: Vec<TaskOutput>, token_usage: UsageMetrics) -> Option<Self> {
        let raw = tasks_output
            .iter()
            .rev()
            .find(|t| !t.raw.trim().is_empty())?
            .raw
            .clone();

        Some(Self {
            raw,
            tasks_output,
            token_usage,
        })
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
