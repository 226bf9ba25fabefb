//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use std::path::Path;

use splatgen_core::config::{CliConfigOverrides, ClientConfig};

use crate::cli::Cli;

const LOCAL_CONFIG: &str = "splatgen.toml";

/// Assemble the layered configuration: defaults, then file, then
/// environment, then CLI flags.
pub fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::with_defaults();

    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
    } else if Path::new(LOCAL_CONFIG).exists() {
        config = config
            .load_from_file(LOCAL_CONFIG)
            .context("failed to load ./splatgen.toml")?;
    }

    config = config.load_from_env();

    config.update_from_cli(CliConfigOverrides {
        base_url: cli.base_url.clone(),
        poll_interval_ms: cli.poll_interval_ms,
        request_timeout_secs: cli.timeout_secs,
        export_format: None,
    });

    Ok(config)
}
