//! `vulnscout file` command handler

use std::path::Path;

use vulnscout_core::VulnscoutConfig;
use vulnscout_engine::ScanRequest;

use crate::cli::FileArgs;
use crate::error::CliError;

/// Execute the `file` command.
pub async fn execute(args: FileArgs, config: &VulnscoutConfig) -> Result<(), CliError> {
    let request = read_manifest(&args.path, args.run.deep).await?;
    super::run_and_render(request, &args.run, config).await
}

async fn read_manifest(path: &Path, deep: bool) -> Result<ScanRequest, CliError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::Command(format!("not a file path: {}", path.display())))?
        .to_owned();
    let content = tokio::fs::read_to_string(path).await?;

    Ok(ScanRequest::Manifest {
        file_name,
        content,
        deep,
    })
}
