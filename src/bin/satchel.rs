//! satchel CLI Binary

use anyhow::Context;
use clap::Parser;
use satchel::logging::init_logging;
use satchel::tooling::cli::{Cli, CliContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliContext::load_config(&cli.workdir, cli.config.as_deref(), cli.root.clone())
        .context("Error loading configuration")?;

    let logging = cli.logging_config(&config.logging);
    init_logging(Some(&logging)).context("Error initializing logging")?;

    let context =
        CliContext::from_config(cli.workdir.clone(), config).context("Error initializing store")?;

    let output = context.execute(&cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
