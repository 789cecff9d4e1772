//! Server lifecycle.
//!
//! Builds the scan engine and job manager from `VulnscoutConfig`, starts the
//! TTL sweeper, and serves the API over HTTP and optionally HTTPS until the
//! cancellation token fires.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use vulnscout_core::VulnscoutConfig;
use vulnscout_core::config::ServerConfig;
use vulnscout_engine::{EngineConfig, ScanEngine, ScanJobManager};

use crate::api::{AppState, router};

/// Time allowed for in-flight HTTPS connections after shutdown begins.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport options that are not part of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServeOptions {
    /// Also serve HTTPS on `server.https_port`.
    pub https: bool,
}

/// Build the job manager described by `config`.
pub async fn build_manager(config: &VulnscoutConfig) -> Result<ScanJobManager> {
    let engine = ScanEngine::builder()
        .config(EngineConfig::from_core(config))
        .build()
        .await
        .context("failed to build scan engine")?;
    Ok(ScanJobManager::in_memory(Arc::new(engine)))
}

/// Run the API server until `cancel` is triggered.
///
/// # Errors
///
/// - Engine construction fails
/// - A listen address is invalid or cannot be bound
/// - HTTPS is requested without a usable certificate and key
pub async fn run(
    config: VulnscoutConfig,
    options: ServeOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let manager = build_manager(&config).await?;
    let sweep_interval = manager.engine().config().sweep_interval();
    let sweeper = manager.spawn_sweeper(sweep_interval, cancel.clone());

    let app = router(AppState::new(manager), &config.server);

    let http = serve_http(app.clone(), &config.server, cancel.clone());
    let https = async {
        if options.https {
            serve_https(app, &config.server, cancel.clone()).await
        } else {
            Ok(())
        }
    };

    let result = tokio::try_join!(http, https);

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "job sweeper task ended abnormally");
    }

    result.map(|_| ())
}

fn socket_addr(bind_addr: &str, port: u16) -> Result<SocketAddr> {
    format!("{bind_addr}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {bind_addr}:{port}"))
}

async fn serve_http(app: Router, config: &ServerConfig, cancel: CancellationToken) -> Result<()> {
    let addr = socket_addr(&config.bind_addr, config.port)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;

    tracing::info!(listen_addr = %addr, "HTTP API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .context("HTTP server error")?;

    tracing::info!(listen_addr = %addr, "HTTP API stopped");
    Ok(())
}

async fn serve_https(app: Router, config: &ServerConfig, cancel: CancellationToken) -> Result<()> {
    if config.tls_cert_path.is_empty() || config.tls_key_path.is_empty() {
        return Err(anyhow::anyhow!(
            "HTTPS requires server.tls_cert_path and server.tls_key_path"
        ));
    }

    let addr = socket_addr(&config.bind_addr, config.https_port)?;
    let tls = RustlsConfig::from_pem_file(&config.tls_cert_path, &config.tls_key_path)
        .await
        .with_context(|| {
            format!(
                "failed to load TLS certificate '{}' and key '{}'",
                config.tls_cert_path, config.tls_key_path
            )
        })?;

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        cancel.cancelled().await;
        shutdown.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
    });

    tracing::info!(listen_addr = %addr, "HTTPS API listening");
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("HTTPS server error")?;

    tracing::info!(listen_addr = %addr, "HTTPS API stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT and return the signal name.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for Ctrl+C and return the signal name.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl+C handler")?;
    Ok("ctrl-c")
}
