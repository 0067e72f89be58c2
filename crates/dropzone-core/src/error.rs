//! Error types and result alias for the dropzone-core crate.
use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
///
/// The gesture and placement paths never fail; these cover startup and
/// configuration only.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a configuration file failed.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid RON for [`crate::DropzoneCfg`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Rendering the configuration back to RON failed.
    #[error("failed to render config: {0}")]
    ConfigRender(#[from] ron::Error),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The input source could not install its event taps.
    #[error("input tap failed to start")]
    TapStart,

    /// Missing or denied system permission.
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),

    /// The engine task has exited and no longer accepts messages.
    #[error("engine stopped")]
    EngineStopped,
}
