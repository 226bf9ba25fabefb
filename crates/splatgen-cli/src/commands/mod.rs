//! Command implementations

mod convert;
mod doctor;
mod generate;
mod inspect;
mod mesh;
mod status;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::config_loader;
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = config_loader::load_config(&cli)?;

    match cli.command {
        Commands::Generate(args) => generate::execute(args, &config, &output).await,
        Commands::Convert(args) => convert::execute(args, &config, &output),
        Commands::Inspect(args) => inspect::execute(args, &output),
        Commands::Status(args) => status::execute(args, &config, &output).await,
        Commands::Mesh(args) => mesh::execute(args, &config, &output).await,
        Commands::Doctor(args) => doctor::execute(args, &config, &output).await,
    }
}
