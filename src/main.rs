use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use stopped_services::app::inventory::platform_inventory;
use stopped_services::{App, Cli};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("Arguments: {cli:?}");

    let config = cli
        .into_config(io::stdout().is_terminal())
        .context("Invalid configuration")?;
    debug!("Configuration: {config:?}");

    let mut app = App::new(&config, platform_inventory(config.scope));
    let summary = app.run(&mut io::stdout().lock());

    Ok(summary.exit_code())
}
