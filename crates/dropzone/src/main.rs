//! Entry point for the `dropzone` binary.

mod check;
mod cli;
mod error;
mod place;
mod presenter;
mod run;

use std::{path::Path, process};

use clap::Parser;
use dropzone_core::DropzoneCfg;
use tracing::{debug, error};

use crate::{
    cli::{Cli, Commands},
    error::{Error, Result},
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Load the configuration from `path`, or from the default location.
fn load_config(path: Option<&Path>) -> Result<DropzoneCfg> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => DropzoneCfg::default_path().ok_or(Error::NoConfigPath)?,
    };
    debug!(path = %path.display(), "loading_config");
    Ok(DropzoneCfg::load(&path)?)
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli {
        log,
        config,
        command,
    } = Cli::parse();
    let spec = logging::init(&log);
    debug!(%spec, "logging_initialized");

    match command {
        Commands::Run => run::run(load_config(config.as_deref())?),
        Commands::Check => check::run(),
        Commands::Place(args) => place::run(&load_config(config.as_deref())?, &args),
        Commands::Config => {
            let cfg = load_config(config.as_deref())?;
            print!("{}", cfg.to_ron_pretty()?);
            Ok(())
        }
    }
}
