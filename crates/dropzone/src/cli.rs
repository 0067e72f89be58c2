//! Command-line interface definitions for dropzone.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `dropzone` binary.
#[derive(Parser, Debug)]
#[command(
    name = "dropzone",
    about = "Shake or hold while dragging files to summon a drop zone",
    version
)]
pub struct Cli {
    /// Logging controls shared across dropzone crates.
    #[command(flatten)]
    pub log: LogArgs,

    /// Path to a RON configuration file. Defaults to the user config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch input and log overlay presentation until interrupted.
    Run,
    /// Report the permissions input watching depends on.
    Check,
    /// Evaluate overlay placement for the given geometry without touching the OS.
    Place(PlaceArgs),
    /// Print the effective configuration as RON.
    Config,
}

/// Arguments for the `place` subcommand.
#[derive(Args, Debug, Clone)]
pub struct PlaceArgs {
    /// Pointer location as `x,y`.
    #[arg(long, value_name = "X,Y")]
    pub cursor: String,

    /// Display as `x,y,w,h`, optionally followed by `/x,y,w,h` for its
    /// usable area. Repeat for several displays; the first is the default.
    #[arg(long = "display", value_name = "FRAME[/VISIBLE]")]
    pub displays: Vec<String>,

    /// Frontmost window rectangle as `x,y,w,h`.
    #[arg(long, value_name = "X,Y,W,H")]
    pub anchor: Option<String>,

    /// Overlay size as `w,h`, overriding the configured size.
    #[arg(long, value_name = "W,H")]
    pub size: Option<String>,
}
