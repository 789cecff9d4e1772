//! `vulnscout health` command handler

use std::time::Duration;

use crate::backend::RemoteBackend;
use crate::cli::HealthArgs;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Execute the `health` command.
///
/// Succeeds only when the server reports `status == "ok"`.
pub async fn execute(args: HealthArgs) -> Result<(), CliError> {
    let backend = RemoteBackend::new(&args.url, Duration::from_secs(args.timeout))?;
    let health = backend.health().await?;

    OutputWriter::new(args.output).render(&health)?;

    if !health.is_ok() {
        return Err(CliError::Unhealthy(health.status));
    }
    Ok(())
}
