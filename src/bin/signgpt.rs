//! SignGPT command-line runner.
//!
//! ```bash
//! cargo run --bin signgpt -- YOU NAME WHAT
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use signgpt::cli::{format_report, Cli};
use signgpt::{AslDataset, Settings, SignGptCrew};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,signgpt=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.apply(Settings::from_env());

    if !settings.api_key_configured() {
        bail!("Missing OPENAI_API_KEY. Set it in your environment or a .env file at repo root.");
    }

    let dataset = AslDataset::load(&settings.dataset_path)
        .with_context(|| format!("Failed to load ASL dataset from {}", settings.dataset_path.display()))?;
    let crew = SignGptCrew::from_settings(&settings)
        .context("Failed to load crew configuration")?
        .with_verbose(cli.verbose);

    let words = cli.words();
    tracing::info!("Translating {:?}", words);

    let output = crew.kickoff(&words, &dataset).await.context("Crew run failed")?;
    print!("{}", format_report(&output));
    Ok(())
}
