use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use vulnscout_core::VulnscoutConfig;
use vulnscout_server::cli::ServerCli;
use vulnscout_server::{LogTarget, ServeOptions, init_tracing, metrics_server, server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();

    let mut config = VulnscoutConfig::load_or_default(&cli.config).await?;
    cli.apply(&mut config);
    config.validate()?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    init_tracing(&config.general, LogTarget::Stdout)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "vulnscout-server starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match server::wait_for_shutdown_signal().await {
            Ok(signal) => tracing::info!(signal, "shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "signal handler failed; shutting down"),
        }
        signal_cancel.cancel();
    });

    let options = ServeOptions { https: cli.https };
    server::run(config, options, cancel).await?;

    tracing::info!("vulnscout-server shut down");
    Ok(())
}
