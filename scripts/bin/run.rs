use std::process::ExitCode;

use clap::Parser;
use helpers::{setup_client, ScriptConfig};
use scripts::run_smoke_test;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "run=info,helpers=info,scripts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ScriptConfig::try_parse() {
        Ok(config) => config,
        // --help and --version
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &ScriptConfig) -> anyhow::Result<()> {
    // keeps a spawned local node alive until the run is over
    let setup = setup_client(&config.network).await?;
    let report = run_smoke_test(&setup, config).await?;
    info!(
        contract = %report.contract,
        event_id = %report.event_id,
        rsvps = report.rsvps.len(),
        confirmed = report.confirmed.len(),
        payout_tx = %report.payout_tx,
        "smoke test passed"
    );
    Ok(())
}
