use anyhow::Context;
use std::sync::Arc;

use forage::config::Config;
use forage::llm::OpenAiClient;
use forage::logging::TracingLogger;
use forage::pipeline::Pipeline;
use forage::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let logger = Arc::new(TracingLogger::new("forage"));

    let client = OpenAiClient::new(
        &config.endpoint_url,
        &config.credential,
        config.completion_timeout,
    )?;
    let pipeline = Pipeline::new(&config, client, logger)?;

    let result = pipeline.run(&config.target_url).await;

    report::persist(&result, &config.output_path)?;
    tracing::info!("results saved to {}", config.output_path.display());

    println!("\n\n{}", report::render_summary(&result)?);
    Ok(())
}
