//! CLI argument definitions for vulnscout-server.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use vulnscout_core::VulnscoutConfig;

/// vulnscout HTTP API server.
///
/// Accepts scan jobs, resolves dependency graphs against public registries
/// and serves reports for polling and export.
#[derive(Parser, Debug)]
#[command(name = "vulnscout-server")]
#[command(version, about, long_about = None)]
pub struct ServerCli {
    /// Path to vulnscout.toml configuration file (defaults apply when missing).
    #[arg(short, long, default_value = "vulnscout.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override HTTP port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override HTTPS port.
    #[arg(long)]
    pub https_port: Option<u16>,

    /// Also serve HTTPS using the configured certificate and key.
    #[arg(long)]
    pub https: bool,

    /// TLS certificate PEM path (overrides config).
    #[arg(long)]
    pub cert: Option<String>,

    /// TLS private key PEM path (overrides config).
    #[arg(long)]
    pub key: Option<String>,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

impl ServerCli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut VulnscoutConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.general.log_format.clone_from(format);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(port) = self.https_port {
            config.server.https_port = port;
        }
        if let Some(cert) = &self.cert {
            config.server.tls_cert_path.clone_from(cert);
        }
        if let Some(key) = &self.key {
            config.server.tls_key_path.clone_from(key);
        }
    }
}
