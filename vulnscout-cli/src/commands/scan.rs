//! `vulnscout scan` command handler

use vulnscout_core::VulnscoutConfig;
use vulnscout_engine::{Ecosystem, ScanRequest};

use crate::cli::ScanArgs;
use crate::error::CliError;

/// Execute the `scan` command.
pub async fn execute(args: ScanArgs, config: &VulnscoutConfig) -> Result<(), CliError> {
    let request = build_request(&args)?;
    super::run_and_render(request, &args.run, config).await
}

fn build_request(args: &ScanArgs) -> Result<ScanRequest, CliError> {
    let ecosystem = Ecosystem::from_str_loose(&args.ecosystem).ok_or_else(|| {
        CliError::Command(format!(
            "invalid ecosystem: {} (expected: pypi, npm, maven, go, rubygems)",
            args.ecosystem
        ))
    })?;

    Ok(ScanRequest::Package {
        ecosystem,
        package: args.package.clone(),
        version: args.ver.clone().filter(|v| !v.trim().is_empty()),
        deep: args.run.deep,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn scan_args(argv: &[&str]) -> ScanArgs {
        match Cli::parse_from(argv).command {
            Commands::Scan(args) => args,
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_build_request_package() {
        let args = scan_args(&["vulnscout", "scan", "PyPI", "requests", "--ver", "2.25.0", "--deep"]);
        let request = build_request(&args).unwrap();
        assert_eq!(
            request,
            ScanRequest::Package {
                ecosystem: Ecosystem::PyPi,
                package: "requests".to_owned(),
                version: Some("2.25.0".to_owned()),
                deep: true,
            }
        );
    }

    #[test]
    fn test_build_request_unknown_ecosystem() {
        let args = scan_args(&["vulnscout", "scan", "cargo", "serde"]);
        let err = build_request(&args).unwrap_err();
        assert!(err.to_string().contains("invalid ecosystem: cargo"));
        assert_eq!(err.exit_code(), 2);
    }
}
