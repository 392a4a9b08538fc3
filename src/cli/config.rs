//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::{ApiCredentials, ConverterConfig, Endpoints, ProcessingMode};
use anyhow::{Context, Result};
use std::time::Duration;

/// Convert CLI arguments to a validated `ConverterConfig`
pub struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration, taking credentials and endpoints from the environment
    pub fn from_cli(cli: &Cli) -> Result<ConverterConfig> {
        Self::from_cli_with(cli, ApiCredentials::from_env(), Endpoints::from_env())
    }

    /// Build the configuration with explicit credentials and endpoints
    pub fn from_cli_with(
        cli: &Cli,
        credentials: ApiCredentials,
        endpoints: Endpoints,
    ) -> Result<ConverterConfig> {
        let request_timeout = match cli.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        ConverterConfig::builder()
            .input_dir(&cli.input_path)
            .output_dir(&cli.output_path)
            .mode(ProcessingMode::from_flags(cli.compress, cli.remove_bg))
            .pattern(cli.pattern.clone())
            .force(cli.force)
            .dry_run(cli.dry_run)
            .request_timeout(request_timeout)
            .credentials(credentials)
            .endpoints(endpoints)
            .build()
            .context("Invalid configuration")
    }
}
