//! Agent module.
//!
//! Contains the `Agent` struct that turns a task prompt into text by
//! calling its language model in character.

pub mod core;

pub use self::core::{Agent, AgentOutput};
