//! Outliner CLI Binary

use anyhow::Context;
use clap::Parser;
use outliner::logging::init_logging;
use outliner::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliContext::load_config(&cli.workspace, cli.config.as_deref())
        .context("Error loading configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    init_logging(&config.logging).context("Error initializing logging")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Error starting runtime")?;

    let context = CliContext::new(cli.workspace.clone(), config)
        .context("Error initializing workspace")?;
    let output = runtime.block_on(context.execute(&cli.command))?;
    println!("{}", output);
    Ok(())
}
