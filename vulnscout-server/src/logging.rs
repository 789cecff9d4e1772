//! Logging initialization for vulnscout-server.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `VulnscoutConfig`. `RUST_LOG` takes precedence over the configured level.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vulnscout_core::config::GeneralConfig;

/// Where formatted log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output (server process).
    Stdout,
    /// Standard error, keeping stdout free for reports (CLI).
    Stderr,
}

/// Initialize the global tracing subscriber.
///
/// Must be called at most once per process.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable output for development
pub fn init_tracing(config: &GeneralConfig, target: LogTarget) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match (config.log_format.as_str(), target) {
        ("json", LogTarget::Stdout) => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        ("json", LogTarget::Stderr) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        ("pretty", LogTarget::Stdout) => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        ("pretty", LogTarget::Stderr) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (other, _) => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            ));
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))
}
