#![doc = include_str!("../README.md")]
//!
//! # Modules
//!
//! - [`api`]: axum router and handlers
//! - [`error`]: `ApiError` and its HTTP mapping
//! - [`health`]: `/health` response
//! - [`server`]: engine wiring, HTTP/HTTPS listeners, graceful shutdown
//! - [`logging`]: tracing subscriber setup
//! - [`metrics_server`]: Prometheus exporter
//! - [`cli`]: command-line arguments

pub mod api;
pub mod cli;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics_server;
pub mod server;

// --- Public API Re-exports ---

pub use api::{AppState, router};
pub use error::ApiError;
pub use health::HealthResponse;
pub use logging::{LogTarget, init_tracing};
pub use server::{ServeOptions, build_manager, run, wait_for_shutdown_signal};
