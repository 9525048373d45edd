//! docroute - route registry and live route updates for generated docs sites.

#![allow(dead_code)]

mod actor;
mod cli;
mod config;
mod core;
mod logger;
mod manifest;
mod page;
mod reload;
mod route;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::RouterConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = RouterConfig::load(&cli)?;
    debug!("config"; "root {}, manifest {}",
        config.root.display(), config.manifest_path().display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Check { pages, .. } => cli::check::check(&config, *pages).await,
            Commands::Resolve { path, data, .. } => {
                cli::resolve::resolve(&config, path, *data).await
            }
            Commands::Serve { .. } => cli::serve::serve(&config).await,
        }
    });

    if let Err(e) = result {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
