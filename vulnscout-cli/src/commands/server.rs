//! `vulnscout server` command handler

use tokio_util::sync::CancellationToken;
use vulnscout_core::VulnscoutConfig;
use vulnscout_server::{ServeOptions, metrics_server, server};

use crate::cli::ServerArgs;
use crate::error::CliError;

/// Execute the `server` command. Runs until SIGINT/SIGTERM.
pub async fn execute(args: ServerArgs, mut config: VulnscoutConfig) -> Result<(), CliError> {
    apply_overrides(&args, &mut config);
    config.validate()?;

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)
            .map_err(|e| CliError::Config(format!("{e:#}")))?;
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

    server::run(config, ServeOptions { https: args.https }, cancel)
        .await
        .map_err(|e| CliError::Command(format!("{e:#}")))
}

fn apply_overrides(args: &ServerArgs, config: &mut VulnscoutConfig) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(port) = args.https_port {
        config.server.https_port = port;
    }
    if let Some(cert) = &args.cert {
        config.server.tls_cert_path.clone_from(cert);
    }
    if let Some(key) = &args.key {
        config.server.tls_key_path.clone_from(key);
    }
}
