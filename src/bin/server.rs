//! SignGPT HTTP server binary.
//!
//! Loads the ASL vocabulary and the crew definitions, then serves the
//! translation API.
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT` - listen address (default: 0.0.0.0:8000)
//! - `SIGNGPT_DATASET` - vocabulary file (default: ./data/english_words.json)
//! - `OPENAI_API_KEY` - LLM credential, required by `/process-tokens`
//! - `OPENAI_MODEL_NAME` - model (default: gpt-4o-mini)
//! - `RUST_LOG` - tracing filter (default: "info,signgpt=debug")
//!
//! A `.env` file in the working directory is read first.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use signgpt::server::{app_router, AppState};
use signgpt::{AslDataset, Settings, SignGptCrew};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,signgpt=debug".into()),
        )
        .init();

    let settings = Settings::from_env();
    tracing::debug!("Settings: {:?}", settings);

    let dataset = AslDataset::load(&settings.dataset_path)
        .with_context(|| format!("Failed to load ASL dataset from {}", settings.dataset_path.display()))?;

    let crew = SignGptCrew::from_settings(&settings).context("Failed to load crew configuration")?;

    if !settings.api_key_configured() {
        tracing::warn!("OPENAI_API_KEY not configured; /process-tokens will fail");
    }

    let bind_addr = settings.bind_addr();
    let state = AppState::new(dataset, settings, crew);
    let app = app_router(state);

    tracing::info!("SignGPT server {} starting on {}", signgpt::VERSION, bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                - service info");
    tracing::info!("  GET  /health          - liveness probe");
    tracing::info!("  POST /process-tokens  - translate ASL tokens");
    tracing::info!("  GET  /asl-dataset     - vocabulary info");
    tracing::info!("  POST /validate-tokens - check tokens against the vocabulary");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
