//! HTTP server for the SignGPT crew.
//!
//! # Endpoints
//!
//! - `GET  /`                - Service banner
//! - `GET  /docs`            - Endpoint listing
//! - `GET  /health`          - Liveness probe and credential check
//! - `POST /process-tokens`  - Run the crew on ASL gloss tokens
//! - `GET  /asl-dataset`     - Vocabulary size and sample
//! - `POST /validate-tokens` - Check tokens against the vocabulary

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{app_router, AppState};
