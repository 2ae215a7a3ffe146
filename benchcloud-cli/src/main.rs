//! Benchcloud CLI
//!
//! Executes verification runs on a cloud master and reports their results.
//! Ctrl-C stops every run that is still outstanding on the service.

mod config;
mod reporter;

use anyhow::{Context, Result, anyhow, bail};
use benchcloud_client::Credentials;
use benchcloud_runner::{
    CloudRunner, OutputHandler, RunnerConfig, RunnerError, TracingOutputHandler, init_client_config,
};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Cli;
use crate::reporter::{ConsoleOutput, Reporter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "benchcloud=info,benchcloud_runner=info,benchcloud_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let benchmark = cli.benchmark()?;

    let runner_config = RunnerConfig::from_env();
    runner_config.validate().map_err(|e| anyhow!(e))?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;

    let credentials = cli.cloud_user.as_deref().map(Credentials::parse);
    let client_config = init_client_config(&cli.cloud_master, credentials, cli.revision.as_deref())
        .await
        .context("Failed to configure the cloud master connection")?;

    let runner = CloudRunner::new(runner_config, Arc::new(client_config));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping outstanding runs");
            interrupt.cancel();
        }
    });

    let display: Box<dyn OutputHandler> = if cli.plain {
        Box::new(TracingOutputHandler)
    } else {
        Box::new(ConsoleOutput)
    };
    let reporter = Reporter::new(display);

    let outcome = runner.execute_benchmark(&benchmark, &reporter, cancel).await;

    if let Some(path) = &cli.results_json {
        reporter.write_json(path)?;
        info!("Results written to {}", path.display());
    }

    match outcome {
        Ok(()) => Ok(()),
        Err(RunnerError::Interrupted) => bail!("Benchmark execution was interrupted"),
        Err(RunnerError::Client(e)) => {
            Err(anyhow!("{} {}", e, e.remedy().unwrap_or_default())).context("Benchmark execution failed")
        }
    }
}
