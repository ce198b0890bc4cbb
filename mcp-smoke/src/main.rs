use anyhow::{Context, Result};

use mcp_smoke::{plan, run, Config, SmokeClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_smoke=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let client = SmokeClient::new(&config)?;
    let steps = plan(&config);

    tracing::info!(
        base_url = %client.base_url(),
        steps = steps.len(),
        timeout = ?config.request_timeout_seconds,
        "Smoke run started"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run(&client, &steps, &mut out)
        .await
        .with_context(|| format!("smoke run against {} aborted", client.base_url()))?;

    tracing::info!(
        steps_completed = summary.steps_completed,
        error_responses = summary.error_responses,
        "Smoke run finished"
    );

    Ok(())
}
