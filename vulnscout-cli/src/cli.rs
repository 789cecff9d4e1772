//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// vulnscout -- dependency vulnerability scanner.
///
/// Use `vulnscout <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "vulnscout", version, about, long_about = None)]
pub struct Cli {
    /// Path to the vulnscout.toml configuration file (defaults apply when missing).
    #[arg(short, long, global = true, default_value = "vulnscout.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Full report as JSON.
    Json,
    /// Markdown document.
    Markdown,
    /// Score and severity counts only.
    Summary,
    /// SARIF 2.1.0.
    Sarif,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a single package and its dependency graph.
    Scan(ScanArgs),

    /// Scan a manifest file (requirements.txt, package.json, pom.xml, go.mod, Gemfile).
    File(FileArgs),

    /// Run the HTTP API server.
    Server(ServerArgs),

    /// Check the health of a running server.
    Health(HealthArgs),
}

/// Options shared by `scan` and `file`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Submit to a running server instead of scanning in-process.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Give up after this many seconds.
    #[arg(short, long, default_value_t = 300)]
    pub timeout: u64,

    /// Resolve the full graph of every dependency.
    #[arg(long)]
    pub deep: bool,

    /// Stream scan progress to stderr.
    #[arg(long)]
    pub verbose: bool,
}

// ---- scan ----

/// Scan a package by coordinates.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Ecosystem (pypi, npm, maven, go, rubygems).
    pub ecosystem: String,

    /// Package name (Maven: groupId:artifactId).
    pub package: String,

    /// Package version (latest when omitted).
    #[arg(long = "ver")]
    pub ver: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

// ---- file ----

/// Scan a manifest file.
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Manifest path; the file name selects the parser.
    pub path: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

// ---- server ----

/// Run the HTTP API server in the foreground.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// HTTP port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// HTTPS port.
    #[arg(long)]
    pub https_port: Option<u16>,

    /// Also serve HTTPS.
    #[arg(long)]
    pub https: bool,

    /// TLS certificate PEM path.
    #[arg(long)]
    pub cert: Option<String>,

    /// TLS private key PEM path.
    #[arg(long)]
    pub key: Option<String>,
}

// ---- health ----

/// Query `GET /health` on a server.
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Server base URL, e.g. http://localhost:3000
    pub url: String,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Output format (`json` prints the raw response).
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}
