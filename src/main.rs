use std::process::ExitCode;

use insider_digest::core::window::edgar_today;
use insider_digest::{Config, EmailReporter, FilingClient, Pipeline, deliver_empty};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    tracing::info!("=== insider-digest ===");

    // Checked before any network activity.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "cannot start");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(threshold = config.min_purchase_usd, "minimum purchase threshold");

    let reporter = EmailReporter::new(&config);
    let outcome = match FilingClient::from_config(&config) {
        Ok(client) => Pipeline::new(config, client).run(&reporter).await,
        Err(e) => {
            tracing::error!(error = %e, "cannot build HTTP client; sending an empty digest");
            deliver_empty(&reporter, edgar_today()).await
        }
    };
    match outcome {
        Ok(summary) => tracing::info!(
            source = summary.source.map_or("none", |s| s.as_str()),
            documents = summary.documents,
            records = summary.records,
            label = %summary.label,
            "done"
        ),
        Err(e) => tracing::error!(error = %e, "digest delivery failed"),
    }
    ExitCode::SUCCESS
}
