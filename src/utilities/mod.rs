//! Utility modules.

pub mod config;
pub mod string_utils;

pub use config::Settings;
