//! Language-model backends for crew agents.
//!
//! - [`base_llm`] - The trait every backend implements, plus message types
//! - [`providers`] - Concrete providers (OpenAI chat completions)

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, LLMError, LLMMessage, LLMResponse};
